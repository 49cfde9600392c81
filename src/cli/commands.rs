pub mod initdb;
pub mod seed;
pub mod settings;

pub use initdb::init_database;
pub use seed::seed_database;
pub use settings::print_settings;
