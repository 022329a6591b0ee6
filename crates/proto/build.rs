// Build script to generate Rust code from protobuf definitions

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Re-run build if the proto file changes
    println!("cargo:rerun-if-changed=proto/processor.proto");

    // protox compiles the descriptor set in pure Rust, no system protoc needed
    let fds = protox::compile(["proto/processor.proto"], ["proto/"])?;

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_fds(fds)?;

    Ok(())
}
