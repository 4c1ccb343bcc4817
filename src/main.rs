fn main() -> anyhow::Result<()> {
    orbit_viewer::run(orbit_viewer::ViewerConfig::default())
}
