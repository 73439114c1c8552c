use tower_http::compression::{
    predicate::{And, DefaultPredicate, Predicate, SizeAbove},
    CompressionLayer,
};

/// Result fragments below this size are sent as-is.
const MIN_COMPRESSED_BYTES: u16 = 512;

/// Negotiates encoding from `Accept-Encoding`, skipping tiny htmx fragments.
pub fn compression_layer() -> CompressionLayer<And<DefaultPredicate, SizeAbove>> {
    CompressionLayer::new()
        .compress_when(DefaultPredicate::new().and(SizeAbove::new(MIN_COMPRESSED_BYTES)))
}
