//! Macros to reduce boilerplate in adapter implementations

/// Implements [`MvcObject`](crate::core::mvc::MvcObject) for an adapter
/// whose property bag lives in the named field.
///
/// Usage:
/// ```ignore
/// impl_mvc_object!(Circle, properties);
/// ```
#[macro_export]
macro_rules! impl_mvc_object {
    ($adapter:ty, $properties_field:ident) => {
        impl $crate::core::mvc::MvcObject for $adapter {
            fn property_bag(&self) -> &$crate::core::mvc::PropertyBag {
                &self.$properties_field
            }
        }
    };
}
