use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use submission_protocol::core::checksum;
use submission_protocol::protocol::message::{
    Exchange, LoginRequest, Request, Response, SubmissionRequest, SubmissionResponse,
};

fn bench_checksum(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum");
    let mut message = Request::Submission(SubmissionRequest::new(
        "Alice A",
        "a@x.com",
        "https://example/repo",
    ))
    .to_bytes(1)
    .to_vec();

    group.bench_function("checksum16_205", |b| {
        b.iter(|| checksum::checksum16(black_box(&message)))
    });
    group.bench_function("verify_205", |b| b.iter(|| checksum::verify(&mut message)));

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let requests = vec![
        Request::Login(LoginRequest::new("alice", "secret")),
        Request::Submission(SubmissionRequest::new(
            "Alice A",
            "a@x.com",
            "https://example/repo",
        )),
        Request::Logout,
    ];

    group.bench_function("encode_requests", |b| {
        b.iter(|| {
            for request in &requests {
                black_box(request.to_bytes(1));
            }
        })
    });

    let response = Response::Submission(SubmissionResponse::new("tok-123", 1)).to_bytes();
    group.bench_function("decode_submission_response", |b| {
        b.iter_batched(
            || response.to_vec(),
            |mut buf| Response::decode(&mut buf, Exchange::Submission),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_checksum, bench_codec);
criterion_main!(benches);
