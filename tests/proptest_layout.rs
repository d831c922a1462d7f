//! Property-based tests for the layout calculator and payload round trips.

use proptest::prelude::*;
use wit_layout::{
    Layout, LayoutCache, StringHandle, Target, TypeDescriptor, VariantLayout, compute_layout,
    variant,
};

fn power_of_two() -> impl Strategy<Value = usize> {
    (0u32..=4).prop_map(|shift| 1usize << shift)
}

fn case_layout() -> impl Strategy<Value = Layout> {
    (0usize..64, power_of_two()).prop_map(|(size, align)| Layout::new(size, align))
}

fn discriminant() -> impl Strategy<Value = usize> {
    prop_oneof![Just(1usize), Just(2), Just(4)]
}

proptest! {
    #[test]
    fn layout_invariants(width in discriminant(), cases in prop::collection::vec(case_layout(), 0..8)) {
        let sizes: Vec<_> = cases.iter().map(|c| c.size).collect();
        let aligns: Vec<_> = cases.iter().map(|c| c.align).collect();
        let layout = compute_layout(width, &sizes, &aligns).unwrap();

        prop_assert!(layout.alignment.is_power_of_two());
        prop_assert!(layout.alignment >= width);
        prop_assert_eq!(layout.data_offset % layout.alignment, 0);
        prop_assert!(layout.data_offset >= width);
        prop_assert_eq!(layout.size % layout.alignment, 0);
        prop_assert!(layout.size >= layout.data_offset);

        for case in &cases {
            prop_assert!(layout.alignment >= case.align);
            prop_assert!(layout.data_offset + case.size <= layout.size);
        }
    }

    #[test]
    fn case_order_does_not_matter(width in discriminant(), mut cases in prop::collection::vec(case_layout(), 1..8)) {
        let forward = VariantLayout::compute(width, &cases);
        cases.reverse();
        prop_assert_eq!(VariantLayout::compute(width, &cases), forward);
    }

    #[test]
    fn cache_agrees_with_calculator(width in discriminant(), cases in prop::collection::vec(case_layout(), 0..6)) {
        let cache = LayoutCache::new();
        let first = cache.variant(width, &cases).unwrap();
        let second = cache.variant(width, &cases).unwrap();
        prop_assert_eq!(first, VariantLayout::compute(width, &cases));
        prop_assert_eq!(first, second);
        prop_assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn descriptor_layout_grows_with_pointer_width(count in 1usize..6) {
        let descriptor = TypeDescriptor::variant(vec![TypeDescriptor::String; count]);
        let narrow = descriptor.size(Target::Wasm32).unwrap();
        let wide = descriptor.size(Target::Wasm64).unwrap();
        prop_assert_eq!(narrow, 12);
        prop_assert_eq!(wide, 24);
    }

    #[test]
    fn roundtrip_u64_case(val in any::<u64>()) {
        type V = variant!(u8; u64, u32);
        let v = V::new(0, val).unwrap();
        prop_assert_eq!(v.case::<u64>(0).unwrap(), Some(val));
        prop_assert_eq!(v.tag(), 0);
    }

    #[test]
    fn roundtrip_u32_case(val in any::<u32>()) {
        type V = variant!(u8; u64, u32);
        let v = V::new(1, val).unwrap();
        prop_assert_eq!(v.case::<u32>(1).unwrap(), Some(val));
        prop_assert_eq!(v.case::<u64>(0).unwrap(), None);
    }

    #[test]
    fn roundtrip_array_case(val in any::<[u8; 9]>()) {
        type V = variant!(u8; [u8; 9], u64);
        let v = V::new(0, val).unwrap();
        prop_assert_eq!(v.case::<[u8; 9]>(0).unwrap(), Some(val));
    }

    #[test]
    fn roundtrip_string_handle(ptr in any::<usize>(), len in any::<usize>()) {
        type V = variant!(u16; StringHandle, ());
        let handle = StringHandle::new(ptr, len);
        let v = V::new(0, handle).unwrap();
        prop_assert_eq!(v.case::<StringHandle>(0).unwrap(), Some(handle));
    }

    #[test]
    fn switching_cases_keeps_latest(first in any::<u64>(), second in any::<u32>()) {
        type V = variant!(u8; u64, u32);
        let mut v = V::new(0, first).unwrap();
        v.set(1, second).unwrap();
        prop_assert_eq!(v.tag(), 1);
        prop_assert_eq!(v.case::<u32>(1).unwrap(), Some(second));
        prop_assert_eq!(v, V::new(1, second).unwrap());
    }
}
