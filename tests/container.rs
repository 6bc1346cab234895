use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cowimage::{Bounds, CowImageError, Image, Matrix, Point, RowMajorMatrix};

fn gradient_image(width: i32, height: i32) -> Image<u8> {
    let bounds = Bounds::with_size(Point::new(0, 0), width, height);
    let data: Vec<u8> = (0..width * height).map(|i| i as u8).collect();
    Image::from_pixels(bounds, data).unwrap()
}

#[test]
fn fresh_image_is_contiguous_and_unique() {
    let img = Image::<u8>::new(4, 3).unwrap();
    assert_eq!(img.buffer_bounds(), img.bounds());
    assert_eq!(img.padding(), 0);
    assert!(img.pixels_are_contiguous());
    assert_eq!(img.ref_count(), 1);
    assert!(img.is_unique());
    assert_eq!(img.len(), 12);
    assert_eq!(img.first_pixel(), Some(&0));
}

#[test]
fn empty_image_has_no_pixels() {
    let img = Image::<u8>::empty();
    assert!(img.is_empty());
    assert_eq!(img.len(), 0);
    assert_eq!(img.first_pixel(), None);
    assert_eq!(img.pixels().count(), 0);
    assert_eq!(img, Image::<u8>::empty());
}

#[test]
fn clone_shares_the_buffer_and_drop_releases() {
    let img = gradient_image(4, 4);
    let copy = img.clone();
    assert_eq!(img.ref_count(), 2);
    assert_eq!(copy.ref_count(), 2);
    assert!(!img.is_unique());
    drop(copy);
    assert_eq!(img.ref_count(), 1);
}

#[test]
fn make_unique_detaches_without_changing_pixels() {
    let img = gradient_image(4, 4);
    let mut copy = img.clone();
    copy.make_unique().unwrap();
    assert_eq!(img.ref_count(), 1);
    assert_eq!(copy.ref_count(), 1);
    assert_eq!(img, copy);

    *copy.pixel_mut(Point::new(0, 0)).unwrap() = 99;
    assert_eq!(img.pixel(Point::new(0, 0)), Some(&0));
    assert_eq!(copy.pixel(Point::new(0, 0)), Some(&99));
}

#[test]
fn make_unique_on_a_view_shrinks_to_the_roi() {
    let img = gradient_image(8, 4);
    let roi = Bounds::with_size(Point::new(2, 1), 3, 2);
    let mut view = img.sub_image(roi).unwrap();
    assert_eq!(view.padding(), 5);

    view.make_unique().unwrap();
    assert_eq!(view.buffer_bounds(), roi);
    assert_eq!(view.padding(), 0);
    for y in roi.min.y..=roi.max.y {
        for x in roi.min.x..=roi.max.x {
            let p = Point::new(x, y);
            assert_eq!(view.pixel(p), img.pixel(p));
        }
    }
}

#[test]
fn sub_image_preserves_values_and_addresses() {
    let img = gradient_image(4, 4);
    let roi = Bounds::with_size(Point::new(1, 1), 2, 2);
    let sub = img.sub_image(roi).unwrap();
    assert_eq!(sub.ref_count(), 2);
    assert_eq!(sub.pixel(Point::new(1, 1)), Some(&5));
    assert_eq!(sub.pixel(Point::new(2, 2)), Some(&10));
    assert_eq!(sub.pixel(Point::new(0, 0)), None);

    for y in roi.min.y..=roi.max.y {
        for x in roi.min.x..=roi.max.x {
            let p = Point::new(x, y);
            assert_eq!(sub.pixel_ptr(p).unwrap(), img.pixel_ptr(p).unwrap());
        }
    }
}

#[test]
fn sub_image_requires_containment() {
    let img = gradient_image(4, 4);
    let outside = Bounds::with_size(Point::new(3, 3), 2, 2);
    let err = img.sub_image(outside).err().unwrap();
    assert_eq!(
        err,
        CowImageError::BoundsNotContained {
            inner: outside,
            outer: img.bounds(),
        }
    );
}

#[test]
fn sub_image_copy_and_deep_copy_own_contiguous_buffers() {
    let img = gradient_image(6, 3);
    let roi = Bounds::with_size(Point::new(2, 0), 3, 3);

    let copy = img.sub_image_copy(roi).unwrap();
    assert_eq!(img.ref_count(), 1);
    assert_eq!(copy.padding(), 0);
    assert_eq!(copy, img.sub_image(roi).unwrap());

    let deep = img.deep_copy().unwrap();
    assert_eq!(deep, img);
    assert_eq!(deep.ref_count(), 1);
}

#[test]
fn row_band_is_a_shared_row_view() {
    let img = gradient_image(4, 4);
    let band = img.row_band(1, 2).unwrap();
    assert_eq!(band.ref_count(), 2);
    assert_eq!(band.height(), 2);
    assert_eq!(band.width(), 4);
    assert_eq!(band.row(0).unwrap(), img.row(1).unwrap());
    assert_eq!(band.row(1).unwrap(), img.row(2).unwrap());
}

#[test]
fn equality_compares_values_not_buffers() {
    let a = gradient_image(4, 4);
    let mut b = a.deep_copy().unwrap();
    assert_eq!(a, b);

    *b.pixel_mut(Point::new(3, 3)).unwrap() ^= 0xFF;
    assert_ne!(a, b);
}

#[test]
fn equality_requires_matching_bounds() {
    let a = gradient_image(4, 4);
    let mut b = a.deep_copy().unwrap();
    b.moved_to(Point::new(1, 0));
    assert_ne!(a, b);
}

#[test]
fn moved_to_translates_only_the_coordinate_frame() {
    let mut img = gradient_image(4, 2);
    let before = img.pixel(Point::new(2, 1)).copied();
    img.moved_to(Point::new(10, -5));
    assert_eq!(img.bounds().min, Point::new(10, -5));
    assert_eq!(img.width(), 4);
    assert_eq!(img.height(), 2);
    assert_eq!(img.pixel(Point::new(12, -4)).copied(), before);
    assert_eq!(img.padding(), 0);
}

#[test]
fn swap_exchanges_images_without_refcount_traffic() {
    let a = gradient_image(2, 2);
    let shared = a.clone();
    let mut a = a;
    let mut b = Image::<u8>::new(3, 1).unwrap();

    a.swap(&mut b);
    assert_eq!(a.bounds(), Bounds::with_size(Point::new(0, 0), 3, 1));
    assert_eq!(b.ref_count(), 2);
    assert_eq!(shared.ref_count(), 2);
    assert_eq!(b, shared);
}

#[test]
fn adopting_a_short_buffer_fails() {
    let bounds = Bounds::with_size(Point::new(0, 0), 3, 3);
    let err = Image::from_slice(bounds, &[0u8; 8]).err().unwrap();
    assert_eq!(err, CowImageError::BufferTooSmall { needed: 9, got: 8 });

    let err = Image::from_pixels(bounds, vec![0u8; 4]).err().unwrap();
    assert_eq!(err, CowImageError::BufferTooSmall { needed: 9, got: 4 });
}

#[test]
fn aliased_memory_is_written_in_place_when_unique() {
    let mut backing = vec![0u8; 6];
    let bounds = Bounds::with_size(Point::new(0, 0), 3, 2);
    {
        let mut img = unsafe { Image::from_raw_parts(bounds, backing.as_mut_ptr(), 6) }.unwrap();
        img.fill(7).unwrap();
    }
    assert_eq!(backing, vec![7u8; 6]);
}

#[test]
fn mutating_a_shared_alias_detaches_instead_of_writing_through() {
    let mut backing = vec![1u8; 4];
    let bounds = Bounds::with_size(Point::new(0, 0), 2, 2);
    {
        let img = unsafe { Image::from_raw_parts(bounds, backing.as_mut_ptr(), 4) }.unwrap();
        let mut copy = img.clone();
        *copy.pixel_mut(Point::new(0, 0)).unwrap() = 9;
        assert!(copy.is_unique());
        assert_eq!(img.pixel(Point::new(0, 0)), Some(&1));
        assert_eq!(copy.pixel(Point::new(0, 0)), Some(&9));
    }
    assert_eq!(backing, vec![1u8; 4]);
}

#[test]
fn release_callback_fires_once_and_is_not_inherited_by_private_copies() {
    let fired = Arc::new(AtomicUsize::new(0));
    let mut backing = vec![5u8; 4];
    let bounds = Bounds::with_size(Point::new(0, 0), 2, 2);

    let img = unsafe { Image::from_raw_parts(bounds, backing.as_mut_ptr(), 4) }.unwrap();
    let counter = Arc::clone(&fired);
    img.set_release_callback(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let shallow = img.clone();
    let private = img.deep_copy().unwrap();
    drop(private);
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    drop(img);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    drop(shallow);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn pixel_ptr_and_coordinates_are_inverse() {
    let img = gradient_image(5, 3);
    for y in 0..3 {
        for x in 0..5 {
            let p = Point::new(x, y);
            let ptr = img.pixel_ptr(p).unwrap();
            assert_eq!(img.coordinates(ptr).unwrap(), p);
        }
    }

    let err = img.pixel_ptr(Point::new(5, 0)).err().unwrap();
    assert!(matches!(err, CowImageError::CoordinatesOutOfBounds { .. }));
}

#[test]
fn coordinates_reject_foreign_and_misaligned_pointers() {
    let img = {
        let bounds = Bounds::with_size(Point::new(0, 0), 3, 2);
        Image::from_pixels(bounds, vec![0u16; 6]).unwrap()
    };
    let base = img.pixel_ptr(Point::new(0, 0)).unwrap();

    let misaligned = (base as *const u8).wrapping_add(1) as *const u16;
    assert_eq!(
        img.coordinates(misaligned).err().unwrap(),
        CowImageError::PointerMisaligned
    );

    let past_end = base.wrapping_add(6);
    assert_eq!(
        img.coordinates(past_end).err().unwrap(),
        CowImageError::PointerOutOfBuffer
    );
}

#[test]
fn converting_copies_apply_per_sample_math() {
    let bounds = Bounds::with_size(Point::new(0, 0), 4, 1);
    let img = Image::from_pixels(bounds, vec![0u8, 64, 128, 255]).unwrap();

    let wide: Image<f32> = img.convert().unwrap();
    assert_eq!(wide.pixel(Point::new(1, 0)), Some(&64.0));

    let unit: Image<f32> = img.convert_scaled(1.0 / 255.0).unwrap();
    assert!((unit.pixel(Point::new(3, 0)).unwrap() - 1.0).abs() < 1e-6);

    let back: Image<u8> = unit.convert_scaled(255.0).unwrap();
    assert_eq!(back, img);
}

#[test]
fn converting_copies_saturate_on_narrowing() {
    let bounds = Bounds::with_size(Point::new(0, 0), 3, 1);
    let img = Image::from_pixels(bounds, vec![-12.0f32, 300.0, 99.6]).unwrap();
    let narrow: Image<u8> = img.convert().unwrap();
    assert_eq!(narrow.row(0).unwrap(), &[0u8, 255, 100]);
}

#[test]
fn matrix_round_trip_reproduces_the_image() {
    let img = gradient_image(3, 2);
    let matrix: Matrix<f64> = img.to_matrix();
    assert_eq!(matrix.rows(), 2);
    assert_eq!(matrix.cols(), 3);
    assert_eq!(matrix.get(1, 2), 5.0);

    let round: Image<u8> = Image::from_matrix(&matrix).unwrap();
    assert_eq!(round, img);
}

#[test]
fn conversion_keeps_the_roi_bounds_of_a_view() {
    let img = gradient_image(6, 4);
    let roi = Bounds::with_size(Point::new(1, 1), 3, 2);
    let view = img.sub_image(roi).unwrap();

    let converted: Image<u16> = view.convert().unwrap();
    assert_eq!(converted.bounds(), roi);
    assert_eq!(converted.padding(), 0);
    assert_eq!(
        converted.pixel(Point::new(2, 2)).copied(),
        view.pixel(Point::new(2, 2)).map(|&v| u16::from(v))
    );
}
