fn main() {
    arith::cli::run();
}
