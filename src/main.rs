use colored::Colorize;

fn main() {
    if let Err(e) = pocket_hornet_lib::run() {
        eprintln!("{} {e:#}", "✗".red().bold());
        std::process::exit(1);
    }
}
