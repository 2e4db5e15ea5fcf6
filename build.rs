use shadow_rs::ShadowBuilder;

fn main() {
    // Bakes git and cargo metadata into the binary for --version output
    ShadowBuilder::builder()
        .build()
        .expect("shadow-rs build metadata");
}