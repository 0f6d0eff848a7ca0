use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mdexam_core::import::replace_image_tokens;
use mdexam_core::parser::{parse_exam, validate_exam};

fn generate_exam(questions: usize, choices: usize) -> String {
    let mut s = String::from("# Benchmark Exam\nTime: 01:00:00\n\n");
    for q in 0..questions {
        s.push_str(&format!("## Question {q}: what does ![[figure_{q}.png]] show?\n"));
        for c in 0..choices {
            let marker = if c == q % choices { 'x' } else { ' ' };
            s.push_str(&format!("- [{marker}] Choice {c} of question {q}\n"));
        }
        s.push_str("Some explanatory text that the parser ignores.\n\n");
    }
    s
}

fn bench_parse_exam(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_exam");

    let small = generate_exam(10, 4);
    let medium = generate_exam(100, 4);
    let large = generate_exam(1000, 6);

    group.bench_function("10_questions", |b| {
        b.iter(|| parse_exam(black_box(&small)))
    });

    group.bench_function("100_questions", |b| {
        b.iter(|| parse_exam(black_box(&medium)))
    });

    group.bench_function("1000_questions", |b| {
        b.iter(|| parse_exam(black_box(&large)))
    });

    group.finish();
}

fn bench_validate_and_images(c: &mut Criterion) {
    let mut group = c.benchmark_group("exam_checks");

    let text = generate_exam(200, 4);
    let exam = parse_exam(&text);

    group.bench_function("validate_200", |b| {
        b.iter(|| validate_exam(black_box(&exam)))
    });

    group.bench_function("replace_image_tokens_200", |b| {
        b.iter(|| {
            replace_image_tokens(black_box(&text), |name| {
                Some(format!("<img src=\"/images/{name}\">"))
            })
        })
    });

    group.finish();
}

criterion_group!(benches, bench_parse_exam, bench_validate_and_images);
criterion_main!(benches);
