//! The standard conversion table for a scientific imaging runtime.

use crate::conversion::registry::{priority, Category, ConversionRegistryBuilder};
use crate::conversion::ConversionConfig;
use crate::types::{DisplayKind, NativeType};

/// Legacy image type, registered only when legacy support is enabled.
pub const LEGACY_IMAGE_TYPE: &str = "ij.ImagePlus";

fn layer(kind: DisplayKind) -> NativeType {
    NativeType::Layer(kind)
}

/// Register every standard entry into `builder`.
pub fn register_standard(builder: &mut ConversionRegistryBuilder, config: &ConversionConfig) {
    let normal = priority::NORMAL;

    builder
        .register(Category::Boolean, "boolean", NativeType::Bool, normal)
        .register(
            Category::Boolean,
            "java.lang.Boolean[]",
            NativeType::list(NativeType::Bool),
            normal,
        )
        .register(Category::Boolean, "java.lang.Boolean", NativeType::Bool, normal)
        .register(
            Category::Boolean,
            "net.imglib2.type.BooleanType",
            NativeType::Bool,
            normal,
        );

    for (primitive, boxed, native) in [
        ("byte", "java.lang.Byte", NativeType::Int),
        ("short", "java.lang.Short", NativeType::Int),
        ("int", "java.lang.Integer", NativeType::Int),
        ("long", "java.lang.Long", NativeType::Int),
        ("float", "java.lang.Float", NativeType::Float),
        ("double", "java.lang.Double", NativeType::Float),
    ] {
        builder
            .register(Category::Number, primitive, native.clone(), normal)
            .register(Category::Number, boxed, native.clone(), normal)
            .register(
                Category::Number,
                format!("{}[]", boxed),
                NativeType::list(native),
                normal,
            );
    }
    builder
        .register(Category::Number, "java.math.BigInteger", NativeType::Int, normal)
        .register(
            Category::Number,
            "net.imglib2.type.numeric.IntegerType",
            NativeType::Int,
            normal,
        )
        .register(
            Category::Number,
            "net.imglib2.type.numeric.RealType",
            NativeType::Float,
            normal,
        )
        .register(
            Category::Number,
            "net.imglib2.type.numeric.ComplexType",
            NativeType::Complex,
            normal,
        )
        .register(
            Category::Number,
            "net.imglib2.type.numeric.NumericType",
            NativeType::Float,
            normal,
        )
        .register(Category::Number, "java.lang.Number", NativeType::Float, normal);

    builder.register_all(
        Category::String,
        ["char", "java.lang.Character[]", "java.lang.Character", "java.lang.String"],
        NativeType::Str,
        normal,
    );

    builder.register(
        Category::Label,
        "net.imglib2.roi.labeling.ImgLabeling",
        layer(DisplayKind::Labels),
        normal,
    );

    builder.register_all(
        Category::Image,
        [
            "net.imglib2.RandomAccessibleInterval",
            "net.imglib2.RandomAccessible",
            "net.imglib2.IterableInterval",
            "net.imglib2.img.Img",
            "net.imagej.display.ImageDisplay",
            "net.imagej.Dataset",
            "net.imagej.display.DatasetView",
        ],
        layer(DisplayKind::Image),
        normal,
    );
    if config.include_legacy_images {
        builder.register(
            Category::Image,
            LEGACY_IMAGE_TYPE,
            layer(DisplayKind::Image),
            normal,
        );
    }

    builder
        .register_all(
            Category::Point,
            [
                "net.imglib2.roi.geom.real.PointMask",
                "net.imglib2.roi.geom.real.RealPointCollection",
            ],
            layer(DisplayKind::Points),
            normal,
        )
        .register_all(
            Category::Shape,
            [
                "net.imglib2.roi.geom.real.Line",
                "net.imglib2.roi.geom.real.Box",
                "net.imglib2.roi.geom.real.SuperEllipsoid",
                "net.imglib2.roi.geom.real.Polygon2D",
                "net.imglib2.roi.geom.real.Polyline",
                "net.imagej.roi.ROITree",
            ],
            layer(DisplayKind::Shapes),
            normal,
        )
        .register(
            Category::Surface,
            "net.imagej.mesh.Mesh",
            layer(DisplayKind::Surface),
            normal,
        )
        .register(
            Category::Track,
            "fiji.plugin.trackmate.Model",
            layer(DisplayKind::Tracks),
            normal,
        )
        .register(
            Category::ColorTable,
            "net.imglib2.display.ColorTable",
            NativeType::ColorMap,
            normal,
        )
        .register(Category::Table, "org.scijava.table.Table", NativeType::Table, normal)
        .register_all(
            Category::Path,
            ["java.io.File", "java.nio.file.Path"],
            NativeType::Path,
            normal,
        )
        .register(Category::Enum, "java.lang.Enum", NativeType::Enum, normal)
        .register(Category::Date, "java.util.Date", NativeType::DateTime, normal);
}

#[cfg(test)]
mod tests {
    use crate::conversion::{Category, ConversionConfig, ConversionRegistry};
    use crate::foreign::ForeignType;
    use crate::types::{DisplayKind, NativeType};
    use std::collections::HashSet;

    #[test]
    fn test_no_duplicate_foreign_types() {
        let registry = ConversionRegistry::standard(&ConversionConfig::default());
        let mut seen = HashSet::new();
        for entry in registry.entries() {
            assert!(
                seen.insert(entry.foreign_type().clone()),
                "{} registered twice",
                entry.foreign_type()
            );
        }
    }

    #[test]
    fn test_categories_are_contiguous_and_ranked() {
        let registry = ConversionRegistry::standard(&ConversionConfig::default());
        let categories: Vec<Category> = registry.entries().iter().map(|e| e.category()).collect();
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);
        assert_eq!(categories[0], Category::Boolean);
    }

    #[test]
    fn test_legacy_images_toggle() {
        let legacy = ForeignType::new(super::LEGACY_IMAGE_TYPE);
        let with = ConversionRegistry::standard(&ConversionConfig {
            include_legacy_images: true,
        });
        let without = ConversionRegistry::standard(&ConversionConfig {
            include_legacy_images: false,
        });

        assert!(with.contains(&legacy));
        assert!(!without.contains(&legacy));
        assert_eq!(with.len(), without.len() + 1);
    }

    #[test]
    fn test_representative_pairs() {
        let registry = ConversionRegistry::standard(&ConversionConfig::default());
        let lookup = |name: &str| {
            registry
                .entries()
                .iter()
                .find(|e| e.foreign_type().name() == name)
                .map(|e| e.native_type().clone())
        };

        assert_eq!(lookup("java.lang.Boolean"), Some(NativeType::Bool));
        assert_eq!(lookup("java.lang.Number"), Some(NativeType::Float));
        assert_eq!(
            lookup("java.lang.Integer[]"),
            Some(NativeType::list(NativeType::Int))
        );
        assert_eq!(
            lookup("net.imglib2.img.Img"),
            Some(NativeType::Layer(DisplayKind::Image))
        );
        assert_eq!(lookup("java.io.File"), Some(NativeType::Path));
        assert_eq!(lookup("org.example.Unknown"), None);
    }
}
