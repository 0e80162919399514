//! End-to-end pipeline tests against an in-memory catalog transport.

use std::collections::HashSet;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use benthos_catalog::{
    ApiFlavor, CatalogClient, CatalogError, CatalogTransport, Credentials, WireResponse,
};
use benthos_core::{UploadConfig, UploadError, UploadPipeline};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Get(String),
    Post(String),
    Patch(String),
    Image(String),
}

#[derive(Default)]
struct MockCatalog {
    calls: Mutex<Vec<Call>>,
    patch_bodies: Mutex<Vec<(String, serde_json::Value)>>,
    /// Image file names whose binary upload should fail.
    failing_images: HashSet<String>,
    /// First deployment POST answers with a duplicate-key body.
    deployment_exists: bool,
    /// Image metadata PATCH answers with one identifier too few.
    drop_last_image_uri: bool,
}

impl MockCatalog {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn image_posts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Image(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    fn deployment_posts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Post(p) if p.contains("deployment")))
            .count()
    }
}

fn ok(body: &str) -> WireResponse {
    WireResponse {
        status: 200,
        location: None,
        body: body.to_string(),
    }
}

fn created(location: &str) -> WireResponse {
    WireResponse {
        status: 201,
        location: Some(location.to_string()),
        body: String::new(),
    }
}

#[async_trait]
impl CatalogTransport for MockCatalog {
    async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<WireResponse, CatalogError> {
        self.calls.lock().unwrap().push(Call::Get(path.to_string()));
        // resume lookup carries the natural key; plain probes do not
        if query.iter().any(|(k, _)| k == "short_name") {
            return Ok(ok(
                r#"{"objects": [{"resource_uri": "/api/dev/deployment/12/"}]}"#,
            ));
        }
        Ok(ok("{}"))
    }

    async fn post_json(
        &self,
        path: &str,
        _query: &[(String, String)],
        _body: &serde_json::Value,
    ) -> Result<WireResponse, CatalogError> {
        let first_deployment_post = self.deployment_posts() == 0;
        self.calls.lock().unwrap().push(Call::Post(path.to_string()));
        if path.contains("campaign") {
            return Ok(created("http://catalog.example.org/api/dev/campaign/3/"));
        }
        if self.deployment_exists && first_deployment_post {
            return Ok(WireResponse {
                status: 400,
                location: None,
                body: "duplicate key value violates unique constraint".to_string(),
            });
        }
        Ok(created("http://catalog.example.org/api/dev/deployment/12/"))
    }

    async fn patch_json(
        &self,
        path: &str,
        _query: &[(String, String)],
        body: &serde_json::Value,
    ) -> Result<WireResponse, CatalogError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Patch(path.to_string()));
        self.patch_bodies
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone()));

        let mut count = body["objects"].as_array().map(|a| a.len()).unwrap_or(0);
        if self.drop_last_image_uri && path.contains("image") {
            count = count.saturating_sub(1);
        }
        let objects: Vec<String> = (0..count)
            .map(|i| format!(r#"{{"resource_uri": "/api/dev/image/{i}/"}}"#))
            .collect();
        Ok(WireResponse {
            status: 202,
            location: None,
            body: format!(r#"{{"objects": [{}]}}"#, objects.join(",")),
        })
    }

    async fn post_image(
        &self,
        _path: &str,
        _query: &[(String, String)],
        _deployment_id: &str,
        file_name: &str,
        _bytes: Vec<u8>,
    ) -> Result<WireResponse, CatalogError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Image(file_name.to_string()));
        if self.failing_images.contains(file_name) {
            return Ok(WireResponse {
                status: 500,
                location: None,
                body: "internal error".to_string(),
            });
        }
        Ok(created("/data/images/ok"))
    }
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

const MANIFEST_HEADER: &str = "version:1.0\n\
Time,Latitude,Longitude,Depth,ImageName,CameraName,CameraAngle,Temperature,Salinity,Pitch,Roll,Yaw,Altitude\n";

fn write_campaign_root(root: &Path) {
    fs::write(
        root.join("campaign.txt"),
        "Version: 1.0\nName: Ningaloo2013\nDescription: reef survey\n\
         Associated Researchers: A. Person\nAssociated Publications: none\n\
         Associated Research Grants: G-42\nStart Date: 2013-05-01\n\
         End Date: 2013-06-01\nContact Person: A. Person\n",
    )
    .unwrap();
}

fn write_deployment(root: &Path, name: &str, manifest_rows: &str, images: &[&str]) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("description.txt"),
        "Version: 1.0\nType: AUV\nDescription: shallow transect\n\
         Operator: J. Bloggs\nKeywords: reef\n",
    )
    .unwrap();
    fs::write(
        dir.join("images.csv"),
        format!("{MANIFEST_HEADER}{manifest_rows}"),
    )
    .unwrap();
    let png = png_bytes();
    for image in images {
        fs::write(dir.join(image), &png).unwrap();
    }
}

fn pipeline(transport: Arc<MockCatalog>) -> UploadPipeline {
    let client = CatalogClient::new(
        transport,
        Credentials {
            username: "tester".to_string(),
            api_key: "key".to_string(),
        },
        ApiFlavor::Standard,
    );
    UploadPipeline::new(client, UploadConfig::default())
}

#[tokio::test]
async fn uploads_campaign_and_skips_records_without_position() {
    let root = tempfile::tempdir().unwrap();
    write_campaign_root(root.path());
    write_deployment(
        root.path(),
        "T1",
        "t0,-20,10,5.0,img0.png,GoPro,Downward,12.0,35.0,0,0,0,1\n\
         t1,null,null,6.0,img1.png,GoPro,Downward,12.0,35.0,0,0,0,1\n\
         t2,-22,12,7.0,img2.png,GoPro,Downward,12.0,35.0,0,0,0,1\n",
        &["img0.png", "img1.png", "img2.png"],
    );

    let transport = Arc::new(MockCatalog::default());
    let uri = pipeline(transport.clone())
        .upload_campaign(root.path())
        .await
        .unwrap();
    assert_eq!(uri, "http://catalog.example.org/api/dev/campaign/3/");

    // the record without coordinates never reaches any payload
    let bodies = transport.patch_bodies.lock().unwrap();
    let (image_path, image_body) = &bodies[0];
    assert_eq!(image_path, "/api/dev/image/");
    let names: Vec<&str> = image_body["objects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["image_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["img0.png", "img2.png"]);

    // geometry strings carry the exact SRID prefix and spacing
    assert_eq!(
        image_body["objects"][0]["position"],
        "SRID=4326;POINT(10 -20)"
    );

    // camera records join to image identifiers by index
    let (camera_path, camera_body) = &bodies[1];
    assert_eq!(camera_path, "/api/dev/camera/");
    let camera_objects = camera_body["objects"].as_array().unwrap();
    assert_eq!(camera_objects.len(), 2);
    assert_eq!(camera_objects[0]["image"], "/api/dev/image/0/");
    assert_eq!(camera_objects[0]["angle"], "0");
    assert_eq!(camera_objects[1]["image"], "/api/dev/image/1/");

    let (measurement_path, measurement_body) = &bodies[2];
    assert_eq!(measurement_path, "/api/dev/measurements/");
    assert_eq!(measurement_body["objects"].as_array().unwrap().len(), 2);

    // only geolocated images are posted, first one first
    assert_eq!(transport.image_posts(), vec!["img0.png", "img2.png"]);
}

#[tokio::test]
async fn stage_order_is_preserved() {
    let root = tempfile::tempdir().unwrap();
    write_campaign_root(root.path());
    write_deployment(
        root.path(),
        "T1",
        "t0,-20,10,5.0,img0.png,GoPro,Downward,12.0,35.0,0,0,0,1\n\
         t1,-21,11,6.0,img1.png,GoPro,Downward,12.0,35.0,0,0,0,1\n",
        &["img0.png", "img1.png"],
    );

    let transport = Arc::new(MockCatalog::default());
    pipeline(transport.clone())
        .upload_campaign(root.path())
        .await
        .unwrap();

    let calls = transport.calls();
    let position = |call: &Call| calls.iter().position(|c| c == call).unwrap();

    let campaign_post = position(&Call::Post("/api/dev/campaign/".to_string()));
    let deployment_post = position(&Call::Post("/api/dev/deployment/".to_string()));
    let image_patch = position(&Call::Patch("/api/dev/image/".to_string()));
    let camera_patch = position(&Call::Patch("/api/dev/camera/".to_string()));
    let measurement_patch = position(&Call::Patch("/api/dev/measurements/".to_string()));
    let first_image = position(&Call::Image("img0.png".to_string()));

    assert!(campaign_post < deployment_post);
    assert!(deployment_post < image_patch);
    assert!(image_patch < camera_patch);
    assert!(camera_patch < measurement_patch);
    assert!(measurement_patch < first_image);

    // the probe hits all four endpoints before the deployment header
    let probe_gets = calls
        .iter()
        .take(deployment_post)
        .filter(|c| matches!(c, Call::Get(_)))
        .count();
    assert_eq!(probe_gets, 4);
}

#[tokio::test]
async fn resumes_existing_deployment_without_second_post() {
    let root = tempfile::tempdir().unwrap();
    write_campaign_root(root.path());
    write_deployment(
        root.path(),
        "T1",
        "t0,-20,10,5.0,img0.png,GoPro,Downward,12.0,35.0,0,0,0,1\n",
        &["img0.png"],
    );

    let transport = Arc::new(MockCatalog {
        deployment_exists: true,
        ..Default::default()
    });
    pipeline(transport.clone())
        .upload_campaign(root.path())
        .await
        .unwrap();

    assert_eq!(transport.deployment_posts(), 1);
    // upload continued against the resolved resource
    assert_eq!(transport.image_posts(), vec!["img0.png"]);
}

#[tokio::test]
async fn partial_pool_failure_reports_completed_and_submitted() {
    let root = tempfile::tempdir().unwrap();
    write_campaign_root(root.path());

    let mut rows = String::new();
    let mut images = Vec::new();
    for i in 0..10 {
        rows.push_str(&format!(
            "t{i},-20.{i},10.{i},5.0,img{i}.png,GoPro,Downward,12.0,35.0,0,0,0,1\n"
        ));
        images.push(format!("img{i}.png"));
    }
    let image_refs: Vec<&str> = images.iter().map(|s| s.as_str()).collect();
    write_deployment(root.path(), "T1", &rows, &image_refs);

    let transport = Arc::new(MockCatalog {
        failing_images: ["img3.png".to_string(), "img7.png".to_string()]
            .into_iter()
            .collect(),
        ..Default::default()
    });
    let err = pipeline(transport)
        .upload_campaign(root.path())
        .await
        .unwrap_err();

    // first image is synchronous; 9 pool tasks, 2 fail
    match err {
        UploadError::PartialUpload {
            completed,
            submitted,
        } => {
            assert_eq!(completed, 7);
            assert_eq!(submitted, 9);
        }
        other => panic!("expected PartialUpload, got {other:?}"),
    }
}

#[tokio::test]
async fn short_identifier_batch_is_a_mismatch_error() {
    let root = tempfile::tempdir().unwrap();
    write_campaign_root(root.path());
    write_deployment(
        root.path(),
        "T1",
        "t0,-20,10,5.0,img0.png,GoPro,Downward,12.0,35.0,0,0,0,1\n\
         t1,-21,11,6.0,img1.png,GoPro,Downward,12.0,35.0,0,0,0,1\n",
        &["img0.png", "img1.png"],
    );

    let transport = Arc::new(MockCatalog {
        drop_last_image_uri: true,
        ..Default::default()
    });
    let err = pipeline(transport.clone())
        .upload_campaign(root.path())
        .await
        .unwrap_err();

    match err {
        UploadError::BatchLengthMismatch {
            submitted,
            returned,
        } => {
            assert_eq!(submitted, 2);
            assert_eq!(returned, 1);
        }
        other => panic!("expected BatchLengthMismatch, got {other:?}"),
    }
    // the camera stage never ran on a broken join
    assert!(!transport
        .calls()
        .contains(&Call::Patch("/api/dev/camera/".to_string())));
}

#[tokio::test]
async fn unknown_camera_angle_aborts_before_camera_stage() {
    let root = tempfile::tempdir().unwrap();
    write_campaign_root(root.path());
    write_deployment(
        root.path(),
        "T1",
        "t0,-20,10,5.0,img0.png,GoPro,Diagonal,12.0,35.0,0,0,0,1\n",
        &["img0.png"],
    );

    let transport = Arc::new(MockCatalog::default());
    let err = pipeline(transport.clone())
        .upload_campaign(root.path())
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::UnknownCameraAngle(angle) if angle == "Diagonal"));
    let calls = transport.calls();
    assert!(!calls.contains(&Call::Patch("/api/dev/camera/".to_string())));
    assert!(transport.image_posts().is_empty());
}

#[tokio::test]
async fn deployment_without_geolocated_records_cannot_be_scanned() {
    let root = tempfile::tempdir().unwrap();
    write_campaign_root(root.path());
    write_deployment(
        root.path(),
        "T1",
        "t0,null,null,5.0,img0.png,GoPro,Downward,12.0,35.0,0,0,0,1\n",
        &["img0.png"],
    );

    let transport = Arc::new(MockCatalog::default());
    let err = pipeline(transport.clone())
        .upload_campaign(root.path())
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Envelope { .. }));
    assert_eq!(transport.deployment_posts(), 0);
}
