fn main() {
    tysolve::cli::run();
}
