use cowimage::{transform, transform2, Bounds, FillPadder, Image, MirrorPadder, Point};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn make_image(width: i32, height: i32) -> Image<u8> {
    let bounds = Bounds::with_size(Point::new(0, 0), width, height);
    let mut data = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let value = ((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF;
            data.push(value as u8);
        }
    }
    Image::from_pixels(bounds, data).unwrap()
}

fn bench_pixels(c: &mut Criterion) {
    let image = make_image(1024, 1024);
    let roi = Bounds::with_size(Point::new(128, 128), 768, 768);
    let view = image.sub_image(roi).unwrap();

    c.bench_function("pixels_sum_contiguous", |b| {
        b.iter(|| {
            let sum: u64 = black_box(&image).pixels().map(|&p| u64::from(p)).sum();
            black_box(sum)
        });
    });

    c.bench_function("pixels_sum_padded_view", |b| {
        b.iter(|| {
            let sum: u64 = black_box(&view).pixels().map(|&p| u64::from(p)).sum();
            black_box(sum)
        });
    });

    c.bench_function("pixels_nth_every_other_row", |b| {
        let run = view.width() as usize;
        b.iter(|| {
            let mut iter = black_box(&view).pixels();
            let mut sum = 0u64;
            while let Some(&p) = iter.next() {
                sum += u64::from(p);
                iter.nth(2 * run - 2);
            }
            black_box(sum)
        });
    });

    c.bench_function("cow_detach_roi", |b| {
        b.iter(|| {
            let mut copy = view.clone();
            copy.make_unique().unwrap();
            black_box(copy)
        });
    });
}

fn bench_padders(c: &mut Criterion) {
    let source = make_image(512, 512);
    let padded_bounds = source.bounds().grown(32);

    c.bench_function("fill_padded_image", |b| {
        let padder = FillPadder::new(0u8);
        b.iter(|| black_box(padder.padded_image(&source, padded_bounds).unwrap()));
    });

    c.bench_function("mirror_padded_image", |b| {
        b.iter(|| black_box(MirrorPadder.padded_image(&source, padded_bounds).unwrap()));
    });
}

fn bench_transforms(c: &mut Criterion) {
    let first = make_image(1024, 1024);
    let second = make_image(1024, 1024);

    c.bench_function("transform_invert", |b| {
        b.iter(|| black_box(transform(&first, |p| !p).unwrap()));
    });

    c.bench_function("transform2_saturating_add", |b| {
        b.iter(|| {
            black_box(transform2(&first, &second, |x, y| x.saturating_add(y)).unwrap())
        });
    });

    #[cfg(feature = "rayon")]
    c.bench_function("transform_invert_parallel", |b| {
        b.iter(|| black_box(cowimage::transform_par(&first, |p| !p).unwrap()));
    });
}

criterion_group!(benches, bench_pixels, bench_padders, bench_transforms);
criterion_main!(benches);
