fn main() {
    if let Err(e) = tender_evaluator::run() {
        eprintln!("tender-evaluator: {e}");
        std::process::exit(1);
    }
}
