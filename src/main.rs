#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("page-effects runs in the browser. Run `trunk serve` or `trunk build --release`.");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    page_effects::frontend::run();
}
