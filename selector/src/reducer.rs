//! Reducer logic for the cascading selector.
//!
//! User intents are validated against the loaded lists before they touch the
//! selection. Every fetch carries a fresh request token; completions carrying
//! any other token are dropped, so a slow response for a superseded region can
//! never overwrite newer data. Superseded sub-region fetches are also cancelled
//! through the runtime.

use crate::environment::SelectorEnvironment;
use crate::error::SelectorError;
use crate::types::{
    ConfirmPolicy, NavigationParams, RegionCode, RequestToken, SelectorAction, SelectorState,
    SubRegionName,
};
use cascade_core::{
    async_effect, cancellable_effect,
    effect::{Effect, EffectId},
    reducer::Reducer,
    smallvec, SmallVec,
};
use std::sync::Arc;

/// Cancellation id of the region list fetch
pub const REGION_FETCH: EffectId = EffectId::from_static("region-selector/regions");

/// Cancellation id of the sub-region list fetch
pub const SUB_REGION_FETCH: EffectId = EffectId::from_static("region-selector/sub-regions");

type Effects = SmallVec<[Effect<SelectorAction>; 4]>;

/// Reducer for the cascading selector
#[derive(Clone, Debug)]
pub struct SelectorReducer;

impl SelectorReducer {
    /// Creates a new `SelectorReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate_region(state: &SelectorState, code: &RegionCode) -> Result<(), SelectorError> {
        if state.regions.contains(code) {
            Ok(())
        } else {
            Err(SelectorError::UnknownRegion(code.clone()))
        }
    }

    /// A sub-region is only valid against the list loaded for the selected region
    fn validate_sub_region(
        state: &SelectorState,
        name: &SubRegionName,
    ) -> Result<(), SelectorError> {
        let current = state
            .selection
            .region
            .as_ref()
            .is_some_and(|region| state.sub_regions.for_region.as_ref() == Some(region));

        if current && state.sub_regions.is_loaded() && state.sub_regions.contains(name) {
            Ok(())
        } else {
            Err(SelectorError::UnknownSubRegion(name.clone()))
        }
    }

    /// Whether picking `code` again should re-fetch its sub-regions
    fn needs_fetch(state: &SelectorState, code: &RegionCode) -> bool {
        state.selection.region.as_ref() != Some(code) || state.sub_regions.is_failed()
    }

    fn fetch_regions(state: &mut SelectorState, env: &SelectorEnvironment) -> Effects {
        let token = state.tokens.issue();
        state.regions.begin(token);
        tracing::info!(token = token.value(), "Fetching regions");

        let directory = Arc::clone(&env.directory);
        smallvec![
            Effect::Cancel(REGION_FETCH),
            cancellable_effect! {
                id: REGION_FETCH,
                async {
                    Some(match directory.regions().await {
                        Ok(regions) => SelectorAction::RegionsLoaded { token, regions },
                        Err(error) => SelectorAction::RegionsFailed { token, error },
                    })
                }
            },
        ]
    }

    fn fetch_sub_regions(
        state: &mut SelectorState,
        region: RegionCode,
        env: &SelectorEnvironment,
    ) -> Effects {
        let token = state.tokens.issue();
        state.sub_regions.begin(token);
        state.sub_regions.for_region = Some(region.clone());
        tracing::info!(region = %region, token = token.value(), "Fetching sub-regions");

        let directory = Arc::clone(&env.directory);
        smallvec![
            Effect::Cancel(SUB_REGION_FETCH),
            cancellable_effect! {
                id: SUB_REGION_FETCH,
                async {
                    Some(match directory.sub_regions(region.clone()).await {
                        Ok(sub_regions) => SelectorAction::SubRegionsLoaded {
                            token,
                            region,
                            sub_regions,
                        },
                        Err(error) => SelectorAction::SubRegionsFailed {
                            token,
                            region,
                            error,
                        },
                    })
                }
            },
        ]
    }

    fn select_region(
        state: &mut SelectorState,
        region: Option<RegionCode>,
        env: &SelectorEnvironment,
    ) -> Effects {
        let Some(code) = region else {
            // Unset: withdraw any in-flight fetch but keep the options on screen
            state.selection.region = None;
            state.selection.sub_region = None;
            state.last_error = None;
            let token = state.tokens.issue();
            state.sub_regions.invalidate(token);
            tracing::debug!(token = token.value(), "Region cleared");
            return smallvec![Effect::Cancel(SUB_REGION_FETCH)];
        };

        if let Err(error) = Self::validate_region(state, &code) {
            tracing::warn!(region = %code, "Rejected region selection");
            state.last_error = Some(error);
            return SmallVec::new();
        }

        if !Self::needs_fetch(state, &code) {
            tracing::debug!(region = %code, "Region already selected");
            return SmallVec::new();
        }

        state.selection.region = Some(code.clone());
        state.selection.sub_region = None;
        state.sub_regions.items.clear();
        state.sub_regions.fetched_at = None;
        state.last_error = None;

        Self::fetch_sub_regions(state, code, env)
    }

    fn select_sub_region(state: &mut SelectorState, sub_region: Option<SubRegionName>) {
        let Some(name) = sub_region else {
            state.selection.sub_region = None;
            state.last_error = None;
            return;
        };

        match Self::validate_sub_region(state, &name) {
            Ok(()) => {
                tracing::debug!(sub_region = %name, "Sub-region selected");
                state.selection.sub_region = Some(name);
                state.last_error = None;
            },
            Err(error) => {
                tracing::warn!(sub_region = %name, "Rejected sub-region selection");
                state.last_error = Some(error);
            },
        }
    }

    fn confirm(state: &mut SelectorState, env: &SelectorEnvironment) -> Effects {
        if env.confirm_policy == ConfirmPolicy::RequireComplete {
            if let Some(missing) = state.selection.missing() {
                let reason = SelectorError::IncompleteSelection { missing };
                tracing::warn!(%missing, "Rejected confirm");
                state.last_error = Some(reason.clone());
                return smallvec![async_effect! {
                    Some(SelectorAction::ConfirmRejected { reason })
                }];
            }
        }

        let params = state.selection.params();
        let navigator = Arc::clone(&env.navigator);
        let screen = Arc::clone(&env.next_screen);
        tracing::info!(screen = %screen, ?params, "Confirming selection");

        smallvec![async_effect! {
            navigator.navigate_to(&screen, params.clone());
            Some(SelectorAction::Navigated { params })
        }]
    }

    fn is_stale(accepted: bool, token: RequestToken, list: &'static str) -> bool {
        if !accepted {
            tracing::debug!(token = token.value(), list, "Discarding stale completion");
        }
        !accepted
    }

    fn clear_network_error(state: &mut SelectorState) {
        if state.last_error.as_ref().is_some_and(SelectorError::is_network) {
            state.last_error = None;
        }
    }

    fn record_navigation(state: &mut SelectorState, params: NavigationParams) {
        state.navigated = Some(params);
        state.last_error = None;
    }
}

impl Default for SelectorReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for SelectorReducer {
    type State = SelectorState;
    type Action = SelectorAction;
    type Environment = SelectorEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== User intents ==========
            SelectorAction::Initialize | SelectorAction::RetryRegions => {
                if state.regions.is_loading() || state.regions.is_loaded() {
                    tracing::debug!(status = ?state.regions.status, "Regions already requested");
                    return SmallVec::new();
                }
                Self::fetch_regions(state, env)
            },

            SelectorAction::SelectRegion(region) => Self::select_region(state, region, env),

            SelectorAction::SelectSubRegion(sub_region) => {
                Self::select_sub_region(state, sub_region);
                SmallVec::new()
            },

            SelectorAction::Confirm => Self::confirm(state, env),

            SelectorAction::RetrySubRegions => {
                let Some(region) = state.selection.region.clone() else {
                    tracing::debug!("No region selected, nothing to retry");
                    return SmallVec::new();
                };
                if !state.sub_regions.is_failed() {
                    return SmallVec::new();
                }
                Self::fetch_sub_regions(state, region, env)
            },

            // ========== Effect results ==========
            SelectorAction::RegionsLoaded { token, regions } => {
                if Self::is_stale(state.regions.accepts(token), token, "regions") {
                    return SmallVec::new();
                }
                tracing::info!(count = regions.len(), "Regions loaded");
                state.regions.finish(regions, env.clock.now());
                Self::clear_network_error(state);
                SmallVec::new()
            },

            SelectorAction::RegionsFailed { token, error } => {
                if Self::is_stale(state.regions.accepts(token), token, "regions") {
                    return SmallVec::new();
                }
                tracing::warn!(error = %error, "Region fetch failed");
                state.regions.fail(error.to_string());
                state.last_error = Some(error);
                SmallVec::new()
            },

            SelectorAction::SubRegionsLoaded {
                token,
                region,
                sub_regions,
            } => {
                if Self::is_stale(state.sub_regions.accepts(token), token, "sub-regions") {
                    return SmallVec::new();
                }
                tracing::info!(region = %region, count = sub_regions.len(), "Sub-regions loaded");
                state.sub_regions.finish(sub_regions, env.clock.now());
                state.sub_regions.for_region = Some(region);
                Self::clear_network_error(state);
                SmallVec::new()
            },

            SelectorAction::SubRegionsFailed {
                token,
                region,
                error,
            } => {
                if Self::is_stale(state.sub_regions.accepts(token), token, "sub-regions") {
                    return SmallVec::new();
                }
                tracing::warn!(region = %region, error = %error, "Sub-region fetch failed");
                state.sub_regions.fail(error.to_string());
                state.last_error = Some(error);
                SmallVec::new()
            },

            SelectorAction::Navigated { params } => {
                Self::record_navigation(state, params);
                SmallVec::new()
            },

            // Already recorded when the confirm was refused
            SelectorAction::ConfirmRejected { .. } => SmallVec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mocks::{MockRegionDirectory, RecordingNavigator};
    use crate::types::{LoadStatus, MissingSelection};
    use cascade_core::environment::Clock;
    use cascade_testing::{ReducerTest, assertions, resolve_effects, test_clock};
    use proptest::prelude::*;

    fn code(value: &str) -> RegionCode {
        RegionCode::new(value)
    }

    fn name(value: &str) -> SubRegionName {
        SubRegionName::new(value)
    }

    fn directory() -> MockRegionDirectory {
        MockRegionDirectory::new()
            .with_regions(["AC", "SP"])
            .with_sub_regions("AC", ["Rio Branco", "Cruzeiro do Sul"])
            .with_sub_regions("SP", ["São Paulo", "Campinas"])
    }

    fn environment(directory: &MockRegionDirectory, navigator: &RecordingNavigator) -> SelectorEnvironment {
        SelectorEnvironment::new(
            Arc::new(directory.clone()),
            Arc::new(navigator.clone()),
            Arc::new(test_clock()),
        )
    }

    fn test_environment() -> SelectorEnvironment {
        environment(&directory(), &RecordingNavigator::new())
    }

    /// Reduce `action` and feed back every produced action, in order
    fn drive(state: &mut SelectorState, env: &SelectorEnvironment, action: SelectorAction) {
        let reducer = SelectorReducer::new();
        let mut queue = vec![action];
        while let Some(next) = queue.pop() {
            let effects = reducer.reduce(state, next, env);
            let mut produced = tokio_test::block_on(resolve_effects(effects));
            produced.reverse();
            queue.extend(produced);
        }
    }

    fn loaded_state(env: &SelectorEnvironment) -> SelectorState {
        let mut state = SelectorState::new();
        drive(&mut state, env, SelectorAction::Initialize);
        state
    }

    #[test]
    fn test_initialize_starts_region_fetch() {
        ReducerTest::new(SelectorReducer::new())
            .with_env(test_environment())
            .given_state(SelectorState::new())
            .when_action(SelectorAction::Initialize)
            .then_state(|state| {
                assert!(state.regions.is_loading());
                assert!(state.regions.items.is_empty());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 2);
                assertions::assert_cancels(effects, &REGION_FETCH);
                assertions::assert_cancellable(effects, &REGION_FETCH);
            })
            .run();
    }

    #[test]
    fn test_second_initialize_is_ignored() {
        ReducerTest::new(SelectorReducer::new())
            .with_env(test_environment())
            .given_state(SelectorState::new())
            .when_action(SelectorAction::Initialize)
            .when_action(SelectorAction::Initialize)
            .then_state(|state| {
                assert_eq!(state.tokens.last().map(RequestToken::value), Some(1));
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 2))
            .run();
    }

    #[test]
    fn test_regions_load_in_directory_order() {
        let env = test_environment();
        let state = loaded_state(&env);

        assert!(state.regions.is_loaded());
        assert_eq!(state.regions.items, vec![code("AC"), code("SP")]);
        assert_eq!(state.regions.fetched_at, Some(test_clock().now()));
        assert_eq!(state.last_error, None);
    }

    #[test]
    fn test_region_fetch_failure_is_retryable() {
        let directory = directory().fail_regions(1);
        let env = environment(&directory, &RecordingNavigator::new());
        let mut state = loaded_state(&env);

        assert!(state.regions.is_failed());
        assert!(state.regions.items.is_empty());
        assert!(state.last_error.as_ref().is_some_and(SelectorError::is_network));

        drive(&mut state, &env, SelectorAction::RetryRegions);

        assert!(state.regions.is_loaded());
        assert_eq!(state.regions.items.len(), 2);
        assert_eq!(state.last_error, None);
        assert_eq!(directory.region_calls(), 2);
    }

    #[test]
    fn test_select_region_clears_stale_sub_region_and_fetches() {
        let env = test_environment();
        let mut state = loaded_state(&env);
        drive(&mut state, &env, SelectorAction::SelectRegion(Some(code("AC"))));
        drive(&mut state, &env, SelectorAction::SelectSubRegion(Some(name("Rio Branco"))));

        ReducerTest::new(SelectorReducer::new())
            .with_env(env)
            .given_state(state)
            .when_action(SelectorAction::SelectRegion(Some(code("SP"))))
            .then_state(|state| {
                assert_eq!(state.selection.region, Some(code("SP")));
                assert_eq!(state.selection.sub_region, None);
                assert!(state.sub_regions.items.is_empty());
                assert!(state.sub_regions.is_loading());
                assert_eq!(state.sub_regions.for_region, Some(code("SP")));
            })
            .then_effects(|effects| {
                assertions::assert_cancels(effects, &SUB_REGION_FETCH);
                assertions::assert_cancellable(effects, &SUB_REGION_FETCH);
            })
            .run();
    }

    #[test]
    fn test_unknown_region_is_rejected_without_state_change() {
        let env = test_environment();
        let state = loaded_state(&env);
        let before = state.clone();

        ReducerTest::new(SelectorReducer::new())
            .with_env(env)
            .given_state(state)
            .when_action(SelectorAction::SelectRegion(Some(code("XX"))))
            .then_state(move |state| {
                assert_eq!(state.selection, before.selection);
                assert_eq!(state.sub_regions, before.sub_regions);
                assert_eq!(
                    state.last_error,
                    Some(SelectorError::UnknownRegion(code("XX")))
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_reselecting_same_region_does_not_refetch() {
        let env = test_environment();
        let mut state = loaded_state(&env);
        drive(&mut state, &env, SelectorAction::SelectRegion(Some(code("SP"))));

        ReducerTest::new(SelectorReducer::new())
            .with_env(env)
            .given_state(state)
            .when_action(SelectorAction::SelectRegion(Some(code("SP"))))
            .then_state(|state| assert!(state.sub_regions.is_loaded()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_reselecting_failed_region_refetches() {
        let directory = directory().fail_sub_regions("SP", 1);
        let env = environment(&directory, &RecordingNavigator::new());
        let mut state = loaded_state(&env);
        drive(&mut state, &env, SelectorAction::SelectRegion(Some(code("SP"))));
        assert!(state.sub_regions.is_failed());

        drive(&mut state, &env, SelectorAction::SelectRegion(Some(code("SP"))));

        assert!(state.sub_regions.is_loaded());
        assert_eq!(state.sub_regions.items, vec![name("São Paulo"), name("Campinas")]);
        assert_eq!(directory.sub_region_calls(), vec![code("SP"), code("SP")]);
    }

    #[test]
    fn test_retry_sub_regions_after_failure() {
        let directory = directory().fail_sub_regions("AC", 1);
        let env = environment(&directory, &RecordingNavigator::new());
        let mut state = loaded_state(&env);
        drive(&mut state, &env, SelectorAction::SelectRegion(Some(code("AC"))));

        assert!(matches!(
            &state.sub_regions.status,
            LoadStatus::Failed { message } if message.starts_with("Network failure")
        ));

        drive(&mut state, &env, SelectorAction::RetrySubRegions);

        assert!(state.sub_regions.is_loaded());
        assert_eq!(state.sub_regions.for_region, Some(code("AC")));
        assert_eq!(state.last_error, None);
    }

    #[test]
    fn test_retry_sub_regions_without_failure_is_ignored() {
        let env = test_environment();
        let mut state = loaded_state(&env);
        drive(&mut state, &env, SelectorAction::SelectRegion(Some(code("AC"))));

        ReducerTest::new(SelectorReducer::new())
            .with_env(env)
            .given_state(state)
            .when_action(SelectorAction::RetrySubRegions)
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_clearing_region_discards_in_flight_fetch() {
        let env = test_environment();
        let mut state = loaded_state(&env);
        drive(&mut state, &env, SelectorAction::SelectRegion(Some(code("AC"))));
        let reducer = SelectorReducer::new();

        // Start an SP fetch but hold its result
        let pending = reducer.reduce(&mut state, SelectorAction::SelectRegion(Some(code("SP"))), &env);
        let cleared = reducer.reduce(&mut state, SelectorAction::SelectRegion(None), &env);

        assertions::assert_cancels(&cleared, &SUB_REGION_FETCH);
        assert!(cleared.iter().all(|e| matches!(e, Effect::Cancel(_))));
        assert_eq!(state.selection.region, None);
        assert_eq!(state.sub_regions.status, LoadStatus::Idle);

        for late in tokio_test::block_on(resolve_effects(pending)) {
            reducer.reduce(&mut state, late, &env);
        }
        assert!(state.sub_regions.items.is_empty());
        assert_eq!(state.sub_regions.status, LoadStatus::Idle);
    }

    #[test]
    fn test_unknown_sub_region_is_rejected() {
        let env = test_environment();
        let mut state = loaded_state(&env);
        drive(&mut state, &env, SelectorAction::SelectRegion(Some(code("SP"))));

        ReducerTest::new(SelectorReducer::new())
            .with_env(env)
            .given_state(state)
            .when_action(SelectorAction::SelectSubRegion(Some(name("Rio Branco"))))
            .then_state(|state| {
                assert_eq!(state.selection.sub_region, None);
                assert_eq!(
                    state.last_error,
                    Some(SelectorError::UnknownSubRegion(name("Rio Branco")))
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_clearing_sub_region() {
        let env = test_environment();
        let mut state = loaded_state(&env);
        drive(&mut state, &env, SelectorAction::SelectRegion(Some(code("SP"))));
        drive(&mut state, &env, SelectorAction::SelectSubRegion(Some(name("Campinas"))));
        drive(&mut state, &env, SelectorAction::SelectSubRegion(None));

        assert_eq!(state.selection.sub_region, None);
        assert_eq!(state.selection.region, Some(code("SP")));
    }

    #[test]
    fn test_sub_region_of_cleared_region_is_rejected() {
        let env = test_environment();
        let mut state = loaded_state(&env);
        drive(&mut state, &env, SelectorAction::SelectRegion(Some(code("SP"))));
        drive(&mut state, &env, SelectorAction::SelectRegion(None));

        ReducerTest::new(SelectorReducer::new())
            .with_env(env)
            .given_state(state)
            .when_action(SelectorAction::SelectSubRegion(Some(name("Campinas"))))
            .then_state(|state| {
                // The SP list is still on screen but no longer backs a selection
                assert!(state.sub_regions.contains(&name("Campinas")));
                assert_eq!(state.selection.sub_region, None);
                assert_eq!(
                    state.last_error,
                    Some(SelectorError::UnknownSubRegion(name("Campinas")))
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_forward_as_is_never_forwards_orphaned_sub_region() {
        let navigator = RecordingNavigator::new();
        let env = environment(&directory(), &navigator)
            .with_confirm_policy(ConfirmPolicy::ForwardAsIs);
        let mut state = loaded_state(&env);
        drive(&mut state, &env, SelectorAction::SelectRegion(Some(code("SP"))));
        drive(&mut state, &env, SelectorAction::SelectRegion(None));
        drive(&mut state, &env, SelectorAction::SelectSubRegion(Some(name("Campinas"))));
        drive(&mut state, &env, SelectorAction::Confirm);

        let expected = NavigationParams {
            selected_region: None,
            selected_sub_region: None,
        };
        assert_eq!(navigator.calls(), vec![("Points".to_string(), expected)]);
    }

    #[test]
    fn test_confirm_forwards_selection_to_navigator() {
        let navigator = RecordingNavigator::new();
        let env = environment(&directory(), &navigator).with_next_screen("Points");
        let mut state = loaded_state(&env);
        drive(&mut state, &env, SelectorAction::SelectRegion(Some(code("SP"))));
        drive(&mut state, &env, SelectorAction::SelectSubRegion(Some(name("Campinas"))));
        drive(&mut state, &env, SelectorAction::Confirm);

        let expected = NavigationParams {
            selected_region: Some(code("SP")),
            selected_sub_region: Some(name("Campinas")),
        };
        assert_eq!(navigator.calls(), vec![("Points".to_string(), expected.clone())]);
        assert_eq!(state.navigated, Some(expected));
    }

    #[test]
    fn test_incomplete_confirm_is_rejected_by_default() {
        let navigator = RecordingNavigator::new();
        let env = environment(&directory(), &navigator);
        let mut state = loaded_state(&env);
        drive(&mut state, &env, SelectorAction::SelectRegion(Some(code("SP"))));

        let effects = SelectorReducer::new().reduce(&mut state, SelectorAction::Confirm, &env);
        let produced = tokio_test::block_on(resolve_effects(effects));

        let reason = SelectorError::IncompleteSelection {
            missing: MissingSelection::SubRegion,
        };
        assert_eq!(
            produced,
            vec![SelectorAction::ConfirmRejected {
                reason: reason.clone()
            }]
        );
        assert_eq!(state.last_error, Some(reason));
        assert!(navigator.calls().is_empty());
    }

    #[test]
    fn test_forward_as_is_passes_unset_values() {
        let navigator = RecordingNavigator::new();
        let env = environment(&directory(), &navigator)
            .with_confirm_policy(ConfirmPolicy::ForwardAsIs)
            .with_next_screen("Map");
        let mut state = SelectorState::new();
        drive(&mut state, &env, SelectorAction::Confirm);

        let (screen, params) = navigator.last().expect("navigation recorded");
        assert_eq!(screen, "Map");
        assert_eq!(params.selected_region, None);
        assert_eq!(params.selected_sub_region, None);
    }

    #[test]
    fn test_late_response_for_superseded_region_is_discarded() {
        let env = test_environment();
        let mut state = loaded_state(&env);
        let reducer = SelectorReducer::new();

        let ac = reducer.reduce(&mut state, SelectorAction::SelectRegion(Some(code("AC"))), &env);
        let sp = reducer.reduce(&mut state, SelectorAction::SelectRegion(Some(code("SP"))), &env);

        // SP answers first, AC straggles in afterwards
        for action in tokio_test::block_on(resolve_effects(sp)) {
            reducer.reduce(&mut state, action, &env);
        }
        for action in tokio_test::block_on(resolve_effects(ac)) {
            reducer.reduce(&mut state, action, &env);
        }

        assert_eq!(state.selection.region, Some(code("SP")));
        assert_eq!(state.sub_regions.for_region, Some(code("SP")));
        assert_eq!(state.sub_regions.items, vec![name("São Paulo"), name("Campinas")]);
    }

    #[test]
    fn test_stale_failure_does_not_mark_list_failed() {
        let directory = directory().fail_sub_regions("AC", 1);
        let env = environment(&directory, &RecordingNavigator::new());
        let mut state = loaded_state(&env);
        let reducer = SelectorReducer::new();

        let ac = reducer.reduce(&mut state, SelectorAction::SelectRegion(Some(code("AC"))), &env);
        drive(&mut state, &env, SelectorAction::SelectRegion(Some(code("SP"))));
        for action in tokio_test::block_on(resolve_effects(ac)) {
            reducer.reduce(&mut state, action, &env);
        }

        assert!(state.sub_regions.is_loaded());
        assert_eq!(state.last_error, None);
    }

    fn region_codes() -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set("[A-Z]{2}", 1..6).prop_map(|set| set.into_iter().collect())
    }

    /// Directory where every region has distinct, region-tagged sub-regions
    fn tagged_directory(codes: &[String]) -> MockRegionDirectory {
        codes.iter().fold(
            MockRegionDirectory::new().with_regions(codes.iter().map(String::as_str)),
            |directory, code| {
                directory.with_sub_regions(code, [format!("{code} North"), format!("{code} South")])
            },
        )
    }

    proptest! {
        #[test]
        fn prop_sub_regions_never_carry_residue(
            codes in region_codes(),
            picks in prop::collection::vec(any::<prop::sample::Index>(), 1..8),
        ) {
            let env = environment(&tagged_directory(&codes), &RecordingNavigator::new());
            let mut state = loaded_state(&env);

            for pick in picks {
                let code = code(&codes[pick.index(codes.len())]);
                drive(&mut state, &env, SelectorAction::SelectRegion(Some(code.clone())));

                prop_assert_eq!(state.sub_regions.for_region.as_ref(), Some(&code));
                prop_assert!(!state.sub_regions.items.is_empty());
                let prefix = format!("{code} ");
                prop_assert!(state.sub_regions.items.iter().all(|n| n.as_str().starts_with(&prefix)));
            }
        }

        #[test]
        fn prop_unset_never_fetches(
            codes in region_codes(),
            pick in any::<prop::sample::Index>(),
        ) {
            let env = environment(&tagged_directory(&codes), &RecordingNavigator::new());
            let mut state = loaded_state(&env);
            drive(&mut state, &env, SelectorAction::SelectRegion(Some(code(&codes[pick.index(codes.len())]))));
            let items_before = state.sub_regions.items.clone();

            let effects = SelectorReducer::new().reduce(&mut state, SelectorAction::SelectRegion(None), &env);

            prop_assert!(effects.iter().all(|e| matches!(e, Effect::Cancel(_))));
            prop_assert_eq!(&state.sub_regions.items, &items_before);
            prop_assert_eq!(state.selection.region.as_ref(), None);
        }

        #[test]
        fn prop_latest_selection_wins_regardless_of_arrival_order(
            codes in region_codes(),
            picks in prop::collection::vec(any::<prop::sample::Index>(), 1..6),
            arrival in any::<prop::sample::Index>(),
        ) {
            let env = environment(&tagged_directory(&codes), &RecordingNavigator::new());
            let mut state = loaded_state(&env);
            let reducer = SelectorReducer::new();

            let mut batches = Vec::new();
            let mut last = None;
            for pick in picks {
                let code = code(&codes[pick.index(codes.len())]);
                batches.push(reducer.reduce(&mut state, SelectorAction::SelectRegion(Some(code.clone())), &env));
                last = Some(code);
            }

            // Deliver results in a rotated order
            let len = batches.len();
            batches.rotate_left(arrival.index(len));
            for batch in batches {
                for action in tokio_test::block_on(resolve_effects(batch)) {
                    reducer.reduce(&mut state, action, &env);
                }
            }

            let last = last.expect("at least one pick");
            prop_assert!(state.sub_regions.is_loaded());
            prop_assert_eq!(state.sub_regions.for_region.as_ref(), Some(&last));
            let prefix = format!("{last} ");
            prop_assert!(state.sub_regions.items.iter().all(|n| n.as_str().starts_with(&prefix)));
        }
    }
}
