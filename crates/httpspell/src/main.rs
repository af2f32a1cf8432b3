use httpspell::print_error;

fn main() {
    if let Err(e) = httpspell::main() {
        print_error!("{e:#}");
        std::process::exit(1);
    }
}
