//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use cascade_core::async_effect;
///
/// async_effect! {
///     let regions = directory.regions().await;
///     Some(SelectorAction::RegionsLoaded { token, regions })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Future` registered for cancellation under an id
///
/// # Example
///
/// ```rust,ignore
/// use cascade_core::cancellable_effect;
///
/// cancellable_effect! {
///     id: SUB_REGION_FETCH,
///     async {
///         let names = directory.sub_regions(&code).await;
///         Some(SelectorAction::SubRegionsLoaded { token, region: code, sub_regions: names })
///     }
/// }
/// ```
#[macro_export]
macro_rules! cancellable_effect {
    (
        id: $id:expr,
        async { $($body:tt)* }
    ) => {
        $crate::effect::Effect::Cancellable {
            id: $id,
            effect: ::std::boxed::Box::new($crate::async_effect! { $($body)* }),
        }
    };
}
