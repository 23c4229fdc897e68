use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod handler;
mod http;
mod logger;
mod routing;
mod server;

use config::{AppState, Config, PortArg, DEFAULT_PORT};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let raw_port = std::env::args().nth(1);
    let port_arg = PortArg::parse(raw_port.as_deref());
    if port_arg == PortArg::Invalid {
        logger::log_invalid_port(raw_port.as_deref().unwrap_or_default(), DEFAULT_PORT);
    }

    let cfg = Config::load(port_arg.port())?;
    let root_dir = std::env::current_dir()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg, root_dir))
}

async fn async_main(cfg: Config, root_dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;
    let bound_addr = listener.local_addr()?;

    let state = Arc::new(AppState::new(cfg, root_dir));

    let script_count =
        match handler::listing::list_scripts(state.root_dir(), state.script_extension()).await {
            Ok(names) => names.len(),
            Err(e) => {
                logger::log_warning(&format!("Could not scan working directory: {e}"));
                0
            }
        };
    logger::log_server_start(
        &bound_addr,
        state.root_dir(),
        state.script_extension(),
        script_count,
    );

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;
    server::run_server(listener, state, shutdown).await;

    Ok(())
}
