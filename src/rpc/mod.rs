mod reader;
#[allow(clippy::module_inception)]
mod rpc;

pub use reader::ChainReader;
pub use rpc::{RateLimitConfig, RetryConfig, RpcClient, RpcClientConfig, RpcError};
