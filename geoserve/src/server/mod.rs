mod feature_server;
mod landing;

pub use feature_server::FeatureServer;
