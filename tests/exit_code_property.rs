use std::sync::Arc;
use std::time::Duration;

use clientrun::exec::{DiscardSink, RunResult};
use clientrun_test_utils::{sh, supervisor};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn exit_code_is_reported_verbatim(code in 0i32..=255) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let sup = supervisor(Duration::from_secs(10), Arc::new(DiscardSink));

        let result = rt.block_on(sup.launch(&sh(&format!("exit {code}"))));

        prop_assert_eq!(&result, &RunResult::Completed { exit_code: code });
        prop_assert_eq!(result.verdict().is_ok(), code == 0);
    }
}
