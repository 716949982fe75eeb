//! Benchmarks for the bionic pipeline and PDF reconstruction.
//!
//! Run with: cargo bench

use bionify::pdf::{PdfMethod, PdfOptions, SpatialEngine};
use bionify::{
    OutputFormat, Pipeline, ProcessingConfig, ReadingProfile, Segmenter, TextDocument,
    WordSplitter,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lopdf::{dictionary, Document, Object, Stream};

const PARAGRAPH: &str = "Bionic reading anchors the eye on the first letters of each word. \
The sample weighed 25kg and E=mc2 stays untouched, while ordinary prose is emphasized.";

/// Builds a PDF with the given number of pages, each with a few lines of text.
fn create_test_pdf(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for i in 0..page_count {
        let content = format!(
            "BT /F1 12 Tf 72 700 Td (Page {} begins with a readable sentence.) Tj \
             0 -16 Td (Benchmark content measuring reconstruction throughput.) Tj \
             0 -16 Td (Another line of ordinary words follows here.) Tj ET",
            i + 1
        );
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Benchmark segmentation and word splitting.
fn bench_analysis(c: &mut Criterion) {
    let segmenter = Segmenter::new();
    let splitter = WordSplitter::new();

    c.bench_function("segment_paragraph", |b| {
        b.iter(|| segmenter.segment(black_box(PARAGRAPH)));
    });

    c.bench_function("split_words", |b| {
        b.iter(|| {
            for word in ["reading", "anchors", "letters", "ordinary", "emphasized"] {
                black_box(splitter.split(black_box(word), 0.5));
            }
        });
    });
}

/// Benchmark single-unit processing per output format.
fn bench_formats(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_text");

    for format in OutputFormat::ALL {
        let pipeline = Pipeline::new(
            ProcessingConfig::new()
                .with_profile(ReadingProfile::Standard)
                .with_format(format),
        )
        .unwrap();
        group.bench_function(format.as_str(), |b| {
            b.iter(|| pipeline.process_text(black_box(PARAGRAPH), None));
        });
    }

    group.finish();
}

/// Benchmark whole documents, sequential and on the worker pool.
fn bench_documents(c: &mut Criterion) {
    let text = vec![PARAGRAPH; 50].join("\n\n");
    let doc = TextDocument::from_text(&text);
    let mut group = c.benchmark_group("process_document");

    let sequential = Pipeline::new(ProcessingConfig::new()).unwrap();
    group.bench_function("sequential_50", |b| {
        b.iter(|| sequential.process_document(black_box(&doc)).unwrap());
    });

    let parallel = Pipeline::new(ProcessingConfig::new().with_parallel(4)).unwrap();
    group.bench_function("parallel_50", |b| {
        b.iter(|| parallel.process_document(black_box(&doc)).unwrap());
    });

    group.finish();
}

/// Benchmark PDF rewriting at various sizes.
fn bench_pdf_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("pdf_rewrite");
    group.sample_size(20);

    for method in [PdfMethod::Morphing, PdfMethod::Redaction] {
        let engine = SpatialEngine::new(Pipeline::new(ProcessingConfig::new()).unwrap())
            .with_options(PdfOptions::new().with_method(method));

        for page_count in [1, 5, 10] {
            let data = create_test_pdf(page_count);
            group.bench_function(format!("{}_{}_pages", method, page_count), |b| {
                b.iter(|| engine.process_bytes(black_box(&data)).unwrap());
            });
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_analysis,
    bench_formats,
    bench_documents,
    bench_pdf_rewrite,
);
criterion_main!(benches);
