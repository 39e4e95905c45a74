//! BVH queries checked against a brute-force scan over the same primitives.

use lux_renderer::{Bvh, Hittable, IntersectionRecord, MaterialId, Ray, Sphere, Triangle, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_point(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

fn random_spheres(rng: &mut StdRng, n: usize) -> Vec<Sphere> {
    (0..n)
        .map(|i| {
            Sphere::new(
                random_point(rng, 10.0),
                rng.gen_range(0.1..1.5),
                MaterialId(0),
                i as u32 + 1,
            )
        })
        .collect()
}

fn random_triangles(rng: &mut StdRng, n: usize) -> Vec<Triangle> {
    (0..n)
        .map(|i| {
            let center = random_point(rng, 10.0);
            Triangle::new(
                center + random_point(rng, 1.5),
                center + random_point(rng, 1.5),
                center + random_point(rng, 1.5),
                MaterialId(0),
                i as u32 + 1,
            )
        })
        .collect()
}

fn random_ray(rng: &mut StdRng) -> Ray {
    let origin = random_point(rng, 15.0);
    let target = random_point(rng, 8.0);
    Ray::new(origin, (target - origin).normalize())
}

fn brute_force<P: Hittable>(primitives: &[P], ray: &Ray) -> IntersectionRecord {
    primitives
        .iter()
        .map(|p| p.intersect(ray))
        .fold(IntersectionRecord::MISS, IntersectionRecord::nearer)
}

fn assert_same_hit(bvh_rec: &IntersectionRecord, oracle: &IntersectionRecord) {
    assert_eq!(bvh_rec.hit, oracle.hit);
    if oracle.hit {
        assert!((bvh_rec.t - oracle.t).abs() < 1e-9, "{} vs {}", bvh_rec.t, oracle.t);
        assert_eq!(bvh_rec.primitive_id, oracle.primitive_id);
    }
}

#[test]
fn bvh_matches_brute_force_on_spheres() {
    let mut rng = StdRng::seed_from_u64(1234);
    for n in [1, 2, 3, 7, 64, 300] {
        let spheres = random_spheres(&mut rng, n);
        let bvh = Bvh::new(&spheres);
        assert_eq!(bvh.node_count(), 2 * n - 1);

        let mut hits = 0;
        for _ in 0..500 {
            let ray = random_ray(&mut rng);
            let oracle = brute_force(&spheres, &ray);
            assert_same_hit(&bvh.nearest_hit(&spheres, &ray), &oracle);
            hits += oracle.hit as usize;
        }
        assert!(hits > 0, "no ray hit anything for n = {n}");
    }
}

#[test]
fn bvh_matches_brute_force_on_triangles() {
    let mut rng = StdRng::seed_from_u64(99);
    for n in [1, 5, 128, 500] {
        let triangles = random_triangles(&mut rng, n);
        let bvh = Bvh::new(&triangles);
        for _ in 0..500 {
            let ray = random_ray(&mut rng);
            assert_same_hit(&bvh.nearest_hit(&triangles, &ray), &brute_force(&triangles, &ray));
        }
    }
}

#[test]
fn bvh_handles_duplicate_centroids() {
    // Every centroid identical: the split still terminates with one leaf each
    let spheres: Vec<Sphere> = (0..9)
        .map(|i| Sphere::new(Vec3::ZERO, 1.0 + i as f32 * 0.1, MaterialId(0), i + 1))
        .collect();
    let bvh = Bvh::new(&spheres);
    assert_eq!(bvh.node_count(), 17);

    let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
    let rec = bvh.nearest_hit(&spheres, &ray);
    assert_eq!(rec.primitive_id, Some(9));
    assert!((rec.t - (10.0 - 1.8)).abs() < 1e-5);
}

#[test]
fn empty_bvh_never_hits() {
    let mut rng = StdRng::seed_from_u64(5);
    let bvh = Bvh::new::<Sphere>(&[]);
    for _ in 0..100 {
        let ray = random_ray(&mut rng);
        let rec = bvh.nearest_hit::<Sphere>(&[], &ray);
        assert!(!rec.hit);
        assert!(rec.t.is_infinite());
    }
}

#[test]
fn sphere_hit_lies_on_surface() {
    let mut rng = StdRng::seed_from_u64(21);
    for _ in 0..200 {
        let center = random_point(&mut rng, 5.0);
        let radius = rng.gen_range(0.1..3.0);
        let sphere = Sphere::new(center, radius, MaterialId(0), 1);

        // Fire from outside straight at the center
        let direction = random_point(&mut rng, 1.0).normalize();
        let origin = center - direction * (radius + rng.gen_range(0.5..20.0));
        let ray = Ray::new(origin, direction);
        let rec = sphere.intersect(&ray);

        assert!(rec.hit);
        let distance = (ray.at(rec.t) - center).length();
        assert!((distance - radius).abs() < 1e-3 * radius.max(1.0), "{distance} vs {radius}");
    }
}

#[test]
fn triangle_barycentrics_are_inside() {
    let mut rng = StdRng::seed_from_u64(77);
    let triangles = random_triangles(&mut rng, 50);
    let mut checked = 0;
    for triangle in &triangles {
        for _ in 0..50 {
            let ray = random_ray(&mut rng);
            if let Some((t, u, v)) = triangle.barycentric_hit(&ray) {
                let w = 1.0 - u - v;
                assert!((w + u + v - 1.0).abs() < 1e-12);
                for weight in [w, u, v] {
                    assert!(weight > 0.0 && weight < 1.0);
                }
                assert!(t > 0.0);
                checked += 1;
            }
        }
    }
    assert!(checked > 0);
}
