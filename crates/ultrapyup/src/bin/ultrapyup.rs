use std::process::ExitCode;

use ultrapyup::main as ultrapyup_main;

fn main() -> ExitCode {
    ultrapyup_main(std::env::args_os())
}
