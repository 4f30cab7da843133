use glom::cluster::{Clustering, Dbscan, Hierarchical, Kmeans, MeanShift, NOISE};
use glom::evaluate::{silhouette, Evaluation};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_kmeans_all_assigned(
        data in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 2), 1..20),
        k in 1usize..5
    ) {
        // Skip if k > n
        if k <= data.len() {
            let model = Kmeans::new(k).with_seed(42);
            let labels = model.fit_predict(&data).unwrap();

            prop_assert_eq!(labels.len(), data.len());
            for &l in &labels {
                prop_assert!(l < k);
            }
        }
    }

    #[test]
    fn prop_kmeans_seeded_runs_agree(
        data in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 3), 2..15),
        seed in 0u64..1000
    ) {
        let a = Kmeans::new(2).with_seed(seed).fit_predict(&data).unwrap();
        let b = Kmeans::new(2).with_seed(seed).fit_predict(&data).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_dbscan_labels_cover_input(
        data in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 2), 1..20),
        eps in 0.1f32..5.0,
        min_pts in 1usize..5
    ) {
        let fit = Dbscan::new(eps, min_pts).fit(&data).unwrap();
        prop_assert_eq!(fit.labels.len(), data.len());

        // Every non-noise label is a valid cluster id.
        for &l in &fit.labels {
            prop_assert!(l == NOISE || l < fit.n_clusters);
        }
        prop_assert_eq!(
            fit.labels.iter().filter(|&&l| l == NOISE).count(),
            fit.noise_count
        );
    }

    #[test]
    fn prop_hierarchical_merge_count(
        data in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 2), 1..12),
        k in 1usize..6
    ) {
        if k <= data.len() {
            let fit = Hierarchical::new(k).fit(&data).unwrap();
            prop_assert_eq!(fit.merges.len(), data.len() - k);
            prop_assert_eq!(fit.labels.len(), data.len());
            for &l in &fit.labels {
                prop_assert!(l < k);
            }
        }
    }

    #[test]
    fn prop_mean_shift_labels_index_modes(
        data in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 2), 1..15),
        bandwidth in 0.5f32..5.0
    ) {
        let fit = MeanShift::new(bandwidth).fit(&data).unwrap();
        prop_assert_eq!(fit.labels.len(), data.len());
        for &l in &fit.labels {
            prop_assert!(l < fit.modes.len());
        }
    }

    #[test]
    fn prop_silhouette_bounded(
        data in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 2), 4..16)
    ) {
        // Alternating labels guarantee two distinct groups.
        let labels: Vec<usize> = (0..data.len()).map(|i| i % 2).collect();
        match silhouette(&data, &labels).unwrap() {
            Evaluation::Score { value, .. } => {
                prop_assert!((-1.0..=1.0).contains(&value), "out of range: {value}");
            }
            Evaluation::NotApplicable { .. } => {
                prop_assert!(false, "two distinct labels must be applicable");
            }
        }
    }
}
