fn main() {
    if let Err(e) = venvr::run_cli() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
