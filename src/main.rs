fn main() -> std::process::ExitCode {
    rootlet_lib::run()
}
