//! Contract between the write-ahead log and the spatial index it protects.
//!
//! The index itself (tree balancing, nearest-neighbour search) lives
//! elsewhere; replay only needs these three mutations.

use crate::object::IndexObject;

/// A mutable spatial index that log records can be replayed into.
pub trait SpatialIndex<T, O> {
    /// Insert an object into the index
    fn insert(&mut self, object: IndexObject<T, O>) -> crate::Result<()>;

    /// Remove the object with the given identifier
    fn delete(&mut self, id: T) -> crate::Result<()>;

    /// Replace the payload of the object with the given identifier
    fn update(&mut self, id: T, data: O) -> crate::Result<()>;
}

impl<T, O, I> SpatialIndex<T, O> for &mut I
where
    I: SpatialIndex<T, O> + ?Sized,
{
    fn insert(&mut self, object: IndexObject<T, O>) -> crate::Result<()> {
        (**self).insert(object)
    }

    fn delete(&mut self, id: T) -> crate::Result<()> {
        (**self).delete(id)
    }

    fn update(&mut self, id: T, data: O) -> crate::Result<()> {
        (**self).update(id, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapIndex {
        objects: HashMap<u32, IndexObject<u32, String>>,
    }

    impl SpatialIndex<u32, String> for MapIndex {
        fn insert(&mut self, object: IndexObject<u32, String>) -> crate::Result<()> {
            self.objects.insert(*object.id(), object);
            Ok(())
        }

        fn delete(&mut self, id: u32) -> crate::Result<()> {
            self.objects.remove(&id);
            Ok(())
        }

        fn update(&mut self, id: u32, data: String) -> crate::Result<()> {
            let object = self
                .objects
                .get_mut(&id)
                .ok_or_else(|| crate::Error::Index(format!("no object with id {}", id)))?;
            object.set_data(data);
            Ok(())
        }
    }

    fn mutate<I: SpatialIndex<u32, String>>(mut index: I) -> crate::Result<()> {
        index.insert(IndexObject::new(1, "a".to_string(), Point::default()))?;
        index.update(1, "b".to_string())?;
        index.insert(IndexObject::new(2, "c".to_string(), Point::default()))?;
        index.delete(2)
    }

    #[test]
    fn test_borrowed_index_is_an_index() {
        let mut index = MapIndex::default();
        mutate(&mut index).unwrap();

        assert_eq!(index.objects.len(), 1);
        assert_eq!(index.objects[&1].data(), "b");
    }

    #[test]
    fn test_index_errors_propagate() {
        let mut index = MapIndex::default();
        let err = index.update(9, "x".to_string()).unwrap_err();
        assert!(matches!(err, crate::Error::Index(_)));
    }
}
