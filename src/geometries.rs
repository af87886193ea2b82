use crate::intersect::{ Intersectable, Intersection };
use crate::ray::Ray;

/// A group of intersectables, itself intersectable.
///
/// Intersecting a group concatenates the hits of every child. An empty group
/// is never hit.
#[derive(Clone, Debug, Default)]
pub struct Geometries {
    children: Vec<Intersectable>,
}

impl Geometries {
    pub fn new() -> Geometries {
        Default::default()
    }

    /// Adds a shape or a nested group.
    pub fn add(&mut self, child: impl Into<Intersectable>) {
        self.children.push(child.into());
    }

    pub fn add_all<I, T>(&mut self, children: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Intersectable>,
    {
        self.children.extend(children.into_iter().map(Into::into));
    }

    /// Adds a child, returning the group.
    pub fn with(mut self, child: impl Into<Intersectable>) -> Geometries {
        self.add(child);
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> &[Intersectable] {
        &self.children
    }

    pub fn intersect(&self, ray: &Ray) -> Vec<Intersection<'_>> {
        self.intersect_within(ray, f64::INFINITY)
    }

    pub fn intersect_within(&self, ray: &Ray, max_distance: f64)
        -> Vec<Intersection<'_>> {
        let mut hits = Vec::new();
        for child in &self.children {
            hits.extend(child.intersect_within(ray, max_distance));
        }

        hits
    }
}

impl<T: Into<Intersectable>> std::iter::FromIterator<T> for Geometries {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Geometries {
        let mut g = Geometries::new();
        g.add_all(iter);
        g
    }
}

#[cfg(test)]
use crate::{ geometry::Shape, tuple::{ Point, Vector } };

#[test]
fn empty_group_is_never_hit() {
    let g = Geometries::new();
    let r = Ray::new(Point::ZERO, Vector::X);

    assert!(g.is_empty());
    assert!(g.intersect(&r).is_empty());
}

#[test]
fn group_collects_hits_of_every_child() {
    let g: Geometries = vec![
        Shape::sphere(Point::new(5.0, 0.0, 0.0), 1.0).unwrap(),
        Shape::sphere(Point::new(10.0, 0.0, 0.0), 1.0).unwrap(),
        Shape::sphere(Point::new(0.0, 10.0, 0.0), 1.0).unwrap(),
    ].into_iter().collect();

    let r = Ray::new(Point::ZERO, Vector::X);
    assert_eq!(g.len(), 3);
    assert_eq!(g.intersect(&r).len(), 4);
    assert_eq!(g.intersect_within(&r, 7.0).len(), 2);
}

#[test]
fn nested_groups_are_flattened_into_hits() {
    let inner = Geometries::new()
        .with(Shape::sphere(Point::new(5.0, 0.0, 0.0), 1.0).unwrap());
    let outer = Geometries::new()
        .with(inner)
        .with(Shape::plane(Point::new(20.0, 0.0, 0.0), Vector::X));

    let r = Ray::new(Point::ZERO, Vector::X);
    let hits = outer.intersect(&r);

    assert_eq!(hits.len(), 3);
    assert_eq!(r.closest_intersection(&hits).map(|h| h.point),
               Some(Point::new(4.0, 0.0, 0.0)));
}
