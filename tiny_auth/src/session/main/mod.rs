mod builder;
mod interceptor;
mod session;


pub use builder::SessionBuilder;
pub use interceptor::SessionInterceptor;
pub use session::Session;
