//! Document assembly benchmarks over a synthetic ten-minute transcript.
//! Run: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use onesub::config::{RenderConfig, RevealMode};
use onesub::model::{LoudnessTable, Segment, Transcript, Word, WordLoudness};
use onesub::pipeline::build_document;

const SEGMENTS: i64 = 200;
const WORDS_PER_SEGMENT: i64 = 8;

fn synthetic_transcript() -> Transcript {
    let segments = (0..SEGMENTS)
        .map(|segment| {
            let base = segment as f64 * 3.0;
            let words = (0..WORDS_PER_SEGMENT)
                .map(|offset| {
                    let index = segment * WORDS_PER_SEGMENT + offset;
                    let start = base + offset as f64 * 0.35;
                    Word::new(index, format!("word{index}"), start, start + 0.3)
                })
                .collect();
            Segment {
                index: segment,
                start: base,
                end: base + 2.9,
                text: String::new(),
                words,
            }
        })
        .collect();
    Transcript::from_segments(segments)
}

fn synthetic_loudness() -> LoudnessTable {
    LoudnessTable::new((0..SEGMENTS * WORDS_PER_SEGMENT).map(|word_index| {
        let rms = ((word_index * 37) % 101) as f64 / 100.0;
        WordLoudness {
            word_index,
            rms,
            peak: rms,
        }
    }))
}

fn bench_build_document(c: &mut Criterion) {
    let transcript = synthetic_transcript();
    let loudness = synthetic_loudness();
    let block = RenderConfig::default();
    let mut per_word = RenderConfig::default();
    per_word.display.reveal_mode = RevealMode::PerWord;
    per_word.display.line_word_limits = vec![3, 3];

    let mut group = c.benchmark_group("build_document");
    group.sample_size(50);

    group.bench_function("segment_block", |b| {
        b.iter(|| black_box(build_document(&transcript, &loudness, &block).render()));
    });
    group.bench_function("segment_per_word_wrapped", |b| {
        b.iter(|| black_box(build_document(&transcript, &loudness, &per_word).render()));
    });

    group.finish();
}

criterion_group!(benches, bench_build_document);
criterion_main!(benches);
