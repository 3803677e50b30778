fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match scry_core::runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => {
            if !error.use_stderr() {
                error.exit();
            }
            eprintln!("[scry-core] {error}");
            std::process::exit(2);
        }
    };

    if let Err(error) = scry_core::runtime::run_with_options(options) {
        eprintln!("[scry-core] runtime failed: {error}");
        std::process::exit(1);
    }
}
