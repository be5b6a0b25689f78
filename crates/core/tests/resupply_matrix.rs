use grail_core::should_consume_resupply;

macro_rules! resupply_case {
    ($name:ident, $used:expr, $limit:expr, $auto:expr, $expected:expr) => {
        #[test]
        fn $name() {
            assert_eq!(should_consume_resupply($used, $limit, $auto), $expected);
        }
    };
}

resupply_case!(resupply_case_0, 0, 0, false, false);
resupply_case!(resupply_case_1, 0, 0, true, true);
resupply_case!(resupply_case_2, 0, 1, false, false);
resupply_case!(resupply_case_3, 0, 1, true, true);
resupply_case!(resupply_case_4, 1, 1, false, false);
resupply_case!(resupply_case_5, 1, 1, true, false);
resupply_case!(resupply_case_6, 2, 1, false, false);
resupply_case!(resupply_case_7, 2, 1, true, false);
resupply_case!(resupply_case_8, 0, 3, true, true);
resupply_case!(resupply_case_9, 1, 3, true, true);
resupply_case!(resupply_case_10, 2, 3, true, true);
resupply_case!(resupply_case_11, 3, 3, true, false);
resupply_case!(resupply_case_12, 4, 3, true, false);
resupply_case!(resupply_case_13, 3, 3, false, false);
resupply_case!(resupply_case_14, 100, 0, true, true);
resupply_case!(resupply_case_15, 100, 0, false, false);
resupply_case!(resupply_case_16, 100, 99, true, false);
resupply_case!(resupply_case_17, 98, 99, true, true);
