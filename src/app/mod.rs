pub mod newsletter;
