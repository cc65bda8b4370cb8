pub mod hash_password;
pub mod init;
pub mod serve;
pub mod version;

pub use hash_password::HashPassword;
pub use init::Init;
pub use serve::Serve;
pub use version::Version;
