use elevator::modules;
use elevator::utilities::error::RunError;

fn main() -> Result<(), RunError> {
    modules::run()
}
