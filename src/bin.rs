#[macro_use]
mod macros;

mod frontend;

use frontend::cli;

pub fn main() {
    cli::main();
}
