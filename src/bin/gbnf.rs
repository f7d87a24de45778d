fn main() {
    gbnf::cli::run();
}
