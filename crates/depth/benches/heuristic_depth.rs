use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use depth::backend::luminance::LuminanceBackend;
use depth::{DepthBackend, DepthConvention, DepthMatrix, encode};
use image::RgbImage;

/// Gradient test pattern (more realistic than a solid color)
fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let r = ((x * 255) / width) as u8;
        let g = ((y * 255) / height) as u8;
        let b = (((x + y) * 127) / (width + height)) as u8;
        image::Rgb([r, g, b])
    })
}

fn benchmark_luminance_backend(c: &mut Criterion) {
    let mut group = c.benchmark_group("luminance_backend");

    let sizes = [(640, 480, "VGA"), (1280, 720, "HD"), (1920, 1080, "Full HD")];
    let backend = LuminanceBackend::default();

    for (width, height, label) in sizes {
        let image = gradient_image(width, height);
        group.throughput(Throughput::Elements((width * height) as u64));

        group.bench_with_input(BenchmarkId::new("estimate", label), &image, |b, image| {
            b.iter(|| backend.estimate(black_box(image)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("depth_encoding");

    for (width, height, label) in [(640, 480, "VGA"), (1920, 1080, "Full HD")] {
        let matrix =
            DepthMatrix::from_shape_fn((height, width), |(y, x)| (x as f32 * 0.3) + (y as f32));
        group.throughput(Throughput::Elements((width * height) as u64));

        group.bench_with_input(BenchmarkId::new("encode", label), &matrix, |b, matrix| {
            b.iter(|| encode(black_box(matrix), DepthConvention::DistanceIncreasing).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_luminance_backend, benchmark_encoding);
criterion_main!(benches);
