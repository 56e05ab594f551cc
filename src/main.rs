fn main() {
    if let Err(err) = hypergen::cli::run_cli() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
