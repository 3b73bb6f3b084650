pub mod v1;

pub mod prelude {
    pub use super::v1 as current;
}
