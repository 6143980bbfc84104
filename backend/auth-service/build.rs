fn main() {
    // Compile proto files for gRPC server generation.
    // auth-service PROVIDES TokenValidation (server implementation).
    tonic_build::configure()
        .build_server(true)
        .build_client(false)
        .compile(
            &["../proto/services/token_validation.proto"],
            &["../proto/services/"],
        )
        .expect("Failed to compile token_validation.proto");
}
