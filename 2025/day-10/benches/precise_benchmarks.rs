use aoc2025_day_10_factory::{part1, part2};
use gungraun::{library_benchmark, library_benchmark_group, main, Dhat, LibraryBenchmarkConfig};
use std::hint::black_box;

// Sample machines inlined to keep file I/O out of the measurement
const SAMPLE: &str = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}";

#[library_benchmark]
#[bench::part1(SAMPLE)]
fn bench_part1(input: &str) {
    black_box(part1::process(black_box(input)).unwrap());
}

#[library_benchmark]
#[bench::part2(SAMPLE)]
fn bench_part2(input: &str) {
    black_box(part2::process(black_box(input)).unwrap());
}

library_benchmark_group!(
    name = day_10_group;
    benchmarks = bench_part1, bench_part2
);

main!(
    config = LibraryBenchmarkConfig::default()
        .tool(Dhat::default());
    library_benchmark_groups = day_10_group
);
