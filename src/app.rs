//! The winit application: window creation, event dispatch and the frame loop.
//!
//! Asset loading runs off the event loop. Its results come back as
//! [`ViewerEvent`]s through an [`EventLoopProxy`], so the session is only ever
//! mutated on the event-loop thread, between frames.

use std::sync::Arc;

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use crate::{
    config::ViewerConfig,
    context::Context,
    error::LoadError,
    loader::{LoadEvent, run_load_pipeline},
    resources::DefaultAssetSource,
    session::ViewerSession,
};

pub enum ViewerEvent {
    /// The GPU context finished initializing (only sent on the web, where
    /// device creation cannot block).
    Initialized(Box<AppState>),
    Load(LoadEvent),
    Failed(LoadError),
}

pub struct AppState {
    pub ctx: Context,
    pub session: ViewerSession,
}

impl AppState {
    async fn new(window: Arc<Window>, config: ViewerConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let session = ViewerSession::new(config, size.width.max(1), size.height.max(1));
        let ctx = Context::new(window, &session).await?;
        Ok(Self { ctx, session })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
        self.session.resize(width, height);
    }
}

/// Drive the load pipeline and forward every outcome to the event loop.
async fn load_scene(config: ViewerConfig, proxy: EventLoopProxy<ViewerEvent>) {
    let source = DefaultAssetSource;
    let mut sink = |event: LoadEvent| {
        if proxy.send_event(ViewerEvent::Load(event)).is_err() {
            log::warn!("the event loop closed before a loaded asset could be delivered");
        }
    };
    if let Err(err) = run_load_pipeline(&source, &config, &mut sink).await {
        if let Err(closed) = proxy.send_event(ViewerEvent::Failed(err)) {
            if let ViewerEvent::Failed(err) = closed.0 {
                log::error!("{:#}", anyhow::Error::from(err));
            }
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<ViewerEvent>,
    config: ViewerConfig,
    state: Option<AppState>,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<ViewerEvent>, config: ViewerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            config,
            state: None,
            last_time: Instant::now(),
        })
    }

    fn initialized(&mut self, mut state: AppState) {
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        state.ctx.window.request_redraw();
        self.state = Some(state);
        self.last_time = Instant::now();
        self.start_loading();
    }

    fn start_loading(&self) {
        let config = self.config.clone();
        let proxy = self.proxy.clone();
        #[cfg(not(target_arch = "wasm32"))]
        {
            // The pipeline borrows non-Send trait objects, so it gets a
            // blocking worker of its own instead of a task
            let handle = self.async_runtime.handle().clone();
            self.async_runtime
                .spawn_blocking(move || handle.block_on(load_scene(config, proxy)));
        }
        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(load_scene(config, proxy));
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn canvas_attributes(
        attributes: winit::window::WindowAttributes,
    ) -> anyhow::Result<winit::window::WindowAttributes> {
        use wasm_bindgen::JsCast;
        use winit::platform::web::WindowAttributesExtWebSys;

        const CANVAS_ID: &str = "canvas";

        let canvas = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(CANVAS_ID))
            .ok_or_else(|| anyhow::anyhow!("the page has no element with id {CANVAS_ID}"))?;
        Ok(attributes.with_canvas(Some(canvas.unchecked_into())))
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("orbit-viewer");

        #[cfg(target_arch = "wasm32")]
        {
            window_attributes = match Self::canvas_attributes(window_attributes) {
                Ok(attributes) => attributes,
                Err(err) => {
                    log::error!("{err:#}");
                    event_loop.exit();
                    return;
                }
            };
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("could not create a window: {err}");
                event_loop.exit();
                return;
            }
        };

        let init_future = AppState::new(window, self.config.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(state) => self.initialized(state),
                Err(err) => {
                    log::error!("could not initialize the renderer: {err:#}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok(state) => {
                        if proxy
                            .send_event(ViewerEvent::Initialized(Box::new(state)))
                            .is_err()
                        {
                            log::error!("the event loop closed during initialization");
                        }
                    }
                    Err(err) => log::error!("could not initialize the renderer: {err:#}"),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Initialized(state) => self.initialized(*state),
            ViewerEvent::Load(load) => match &mut self.state {
                Some(state) => state.session.apply(load),
                None => log::warn!("dropping a loaded asset because the viewer is not initialized"),
            },
            // Failures are reported and the viewer keeps rendering what it has
            ViewerEvent::Failed(err) => log::error!("{:#}", anyhow::Error::from(err)),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.session.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                state.session.update(dt);

                match state.ctx.render(&mut state.session) {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Open a window and run the viewer until it is closed.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            eprintln!("Warning: Could not initialize logger: {}", e);
        };
    }
    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info)
            .map_err(|err| anyhow::anyhow!("could not initialize logging: {err}"))?;
    }

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    event_loop.run_app(&mut app)?;
    Ok(())
}
