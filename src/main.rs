use colored::Colorize;

fn main() {
    if let Err(e) = graph2tab::run() {
        eprintln!("{} {:?}", "error:".red(), e);
        std::process::exit(1);
    }
}
