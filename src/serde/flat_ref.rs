use {
    crate::{FlatRef, value::Value},
    serde::{Serialize, ser::SerializeMap},
    tracing::instrument,
};

impl<T> Serialize for FlatRef<'_, T>
where
    T: Serialize + ?Sized,
{
    #[instrument(level = "trace", skip_all)]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        Value::from_serialize(self.value)
            .map_err(serde::ser::Error::custom)
            .map(|value| self.flattener.flatten(&value, self.prefix))
            .and_then(|flattened| flattened.into_result().map_err(serde::ser::Error::custom))
            .and_then(move |entries| {
                serializer.serialize_map(Some(entries.len())).and_then(|mut map| {
                    entries
                        .iter()
                        .try_for_each(|(k, v)| map.serialize_entry(k, v))
                        .and_then(|()| map.end())
                })
            })
    }
}
