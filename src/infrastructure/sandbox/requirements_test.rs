use super::scan_imports;

#[test]
fn it_finds_third_party_imports() {
    let source = "import pygame\nimport numpy\n\nprint('hi')";
    assert_eq!(scan_imports(source), vec!["pygame", "numpy"]);
}

#[test]
fn it_omits_the_standard_library() {
    let source = "import os\nimport sys\nimport math\nimport pygame";
    assert_eq!(scan_imports(source), vec!["pygame"]);
}

#[test]
fn it_handles_from_imports_and_aliases() {
    let source = "from ursina import Entity\nimport numpy as np\nfrom math import sin";
    assert_eq!(scan_imports(source), vec!["ursina", "numpy"]);
}

#[test]
fn it_handles_comma_separated_imports() {
    let source = "import os, pygame, random, numpy";
    assert_eq!(scan_imports(source), vec!["pygame", "numpy"]);
}

#[test]
fn it_takes_the_top_level_module_only() {
    let source = "from pygame.locals import QUIT\nimport matplotlib.pyplot as plt";
    assert_eq!(scan_imports(source), vec!["pygame", "matplotlib"]);
}

#[test]
fn it_skips_relative_imports() {
    let source = "from . import helpers\nfrom .physics import Ball";
    assert!(scan_imports(source).is_empty());
}

#[test]
fn it_catches_indented_imports() {
    let source = "def lazy():\n    import pygame\n    return pygame";
    assert_eq!(scan_imports(source), vec!["pygame"]);
}

#[test]
fn it_maps_import_names_to_package_names() {
    let source = "import cv2\nfrom PIL import Image\nimport yaml";
    assert_eq!(scan_imports(source), vec!["opencv-python", "Pillow", "PyYAML"]);
}

#[test]
fn it_deduplicates_while_preserving_order() {
    let source = "import numpy\nimport pygame\nfrom numpy import array\nimport pygame";
    assert_eq!(scan_imports(source), vec!["numpy", "pygame"]);
}

#[test]
fn it_is_idempotent() {
    let source = "import pygame\nfrom PIL import Image\nimport os, numpy";
    assert_eq!(scan_imports(source), scan_imports(source));
}
