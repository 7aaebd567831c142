//! Tests for k-nearest color queries, tie ordering and the candidate pool

#[cfg(test)]
mod tests {
    use framemosaic::MosaicError;
    use framemosaic::color::extractor::{CandidateTile, RgbColor};
    use framemosaic::color::index::{CandidatePool, ColorIndex};
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn distance(a: RgbColor, b: RgbColor) -> i32 {
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| (i32::from(x) - i32::from(y)).pow(2))
            .sum()
    }

    fn brute_force(colors: &[RgbColor], target: RgbColor, k: usize) -> Vec<usize> {
        let mut ranked: Vec<(i32, usize)> = colors
            .iter()
            .enumerate()
            .map(|(i, &c)| (distance(c, target), i))
            .collect();
        ranked.sort_unstable();
        ranked.into_iter().take(k).map(|(_, i)| i).collect()
    }

    fn random_colors(count: usize, seed: u64) -> Vec<RgbColor> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| [rng.random(), rng.random(), rng.random()])
            .collect()
    }

    // Tests an exact color match is returned first
    // Verified by skipping the far subtree unconditionally
    #[test]
    fn test_exact_match_is_nearest() {
        let colors = random_colors(500, 1);
        let index = ColorIndex::build(&colors).unwrap();

        for (i, &color) in colors.iter().enumerate().step_by(37) {
            let nearest = index.nearest(color, 1).unwrap();
            assert_eq!(distance(colors[nearest[0]], color), 0);
            if colors.iter().filter(|&&c| c == color).count() == 1 {
                assert_eq!(nearest, vec![i]);
            }
        }
    }

    // Tests results agree with brute force and are ordered nearest first
    // Verified by inverting the heap comparison
    #[test]
    fn test_matches_brute_force() {
        let colors = random_colors(2_000, 7);
        let queries = random_colors(300, 8);
        let index = ColorIndex::build(&colors).unwrap();

        let table = index.query(&queries, 6).unwrap();
        assert_eq!(table.len(), queries.len());

        for (row, &query) in table.rows().zip(&queries) {
            assert_eq!(row, brute_force(&colors, query, 6).as_slice());
            for pair in row.windows(2) {
                assert!(distance(colors[pair[0]], query) <= distance(colors[pair[1]], query));
            }
        }
    }

    // Tests equal distances resolve to the lower index
    // Verified by pruning subtrees whose bound equals the worst distance
    #[test]
    fn test_ties_break_by_index() {
        let colors: Vec<RgbColor> = (0..40).map(|_| [100, 100, 100]).collect();
        let index = ColorIndex::build(&colors).unwrap();

        assert_eq!(index.nearest([100, 100, 100], 3).unwrap(), vec![0, 1, 2]);
        assert_eq!(index.nearest([0, 0, 0], 1).unwrap(), vec![0]);
    }

    // Tests symmetric ties across the split plane still prefer the lower index
    // Verified by exploring only the near side
    #[test]
    fn test_ties_across_split() {
        let mut colors: Vec<RgbColor> = (0..20).map(|i| [200, i, 0]).collect();
        colors.push([10, 0, 0]);
        colors.insert(0, [30, 0, 0]);
        let index = ColorIndex::build(&colors).unwrap();

        // [20, 0, 0] is 10 away from both index 0 and the last entry
        assert_eq!(index.nearest([20, 0, 0], 1).unwrap(), vec![0]);
    }

    // Tests k equal to the population returns every index exactly once
    // Verified by deduplicating nothing and truncating at k - 1
    #[test]
    fn test_full_population_query() {
        let colors = random_colors(50, 3);
        let index = ColorIndex::build(&colors).unwrap();

        let all = index.nearest([128, 128, 128], colors.len()).unwrap();
        let mut sorted = all.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..colors.len()).collect::<Vec<_>>());
        assert_eq!(all, brute_force(&colors, [128, 128, 128], colors.len()));
    }

    // Tests k beyond the population fails explicitly
    // Verified by clamping k silently
    #[test]
    fn test_k_exceeding_population_fails() {
        let index = ColorIndex::build(&[[0, 0, 0], [1, 1, 1]]).unwrap();

        match index.query(&[[0, 0, 0]], 3) {
            Err(MosaicError::NeighborCountExceedsPool {
                requested,
                available,
            }) => {
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => unreachable!("Expected NeighborCountExceedsPool, got {other:?}"),
        }
        assert!(index.query(&[[0, 0, 0]], 0).is_err());
    }

    // Tests an empty color list cannot be indexed
    // Verified by building an empty leaf
    #[test]
    fn test_empty_build_fails() {
        assert!(matches!(
            ColorIndex::build(&[]),
            Err(MosaicError::EmptyCandidatePool { .. })
        ));
    }

    // Tests bulk queries with no points return an empty table
    // Verified by dividing by zero in len
    #[test]
    fn test_query_no_points() {
        let index = ColorIndex::build(&[[5, 5, 5]]).unwrap();
        let table = index.query(&[], 1).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.row(0), None);
    }

    // Tests pool positions resolve to the identifier built at the same position
    // Verified by sorting identifiers independently of colors
    #[test]
    fn test_pool_keeps_identifiers_in_step() {
        let pool = CandidatePool::build(vec![
            CandidateTile {
                identifier: "z.jpg".to_string(),
                color: [255, 0, 0],
            },
            CandidateTile {
                identifier: "a.jpg".to_string(),
                color: [0, 0, 255],
            },
        ])
        .unwrap();

        let nearest = pool.index().nearest([0, 0, 250], 1).unwrap();
        assert_eq!(pool.identifier(nearest[0]), Some("a.jpg"));
        assert_eq!(pool.color(0), Some([255, 0, 0]));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.identifiers(), ["z.jpg", "a.jpg"]);
    }
}
