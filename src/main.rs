use phasemap::cli::run;
use phasemap::config::ConfigError;
use phasemap::ingest::LoadError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("PHASEMAP_LOG", "warn"))
        .format_timestamp(None)
        .init();

    // Truecolor swatches need VT processing on Windows consoles
    let _ = enable_ansi_support::enable_ansi_support();

    if let Err(e) = run() {
        // Bad input files and configuration are user errors
        let is_user_error = e.downcast_ref::<LoadError>().is_some()
            || e.downcast_ref::<ConfigError>().is_some();

        if is_user_error {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }

        eprintln!("Internal error: {}", e);
        // Show error chain if available
        let mut source = e.source();
        if source.is_some() {
            eprintln!("\nCaused by:");
            let mut indent = 1;
            while let Some(err) = source {
                eprintln!("{:indent$}  {}", "", err);
                source = err.source();
                indent += 1;
            }
        }
        std::process::exit(2);
    }
}
