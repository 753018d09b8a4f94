// This binary crate is intentionally minimal.
// Training logic lives in the library (src/lib.rs and its modules).
// Run the synthetic demo with:
//   cargo run --example synthetic_fog
fn main() {
    tracing_subscriber::fmt().init();
    tracing::info!("fog-cyclegan: CycleGAN training between clear and foggy images.");
    tracing::info!("Run `cargo run --example synthetic_fog` for a small end-to-end run.");
}
